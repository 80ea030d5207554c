use super::super::super::QUEUE_SIZE_QUIZ_WORKFLOW;
use library::communication::event::{Notification, QueueDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const QUEUE_KEY: &str = "quiz.submitted";
const QUEUE_SIZE: usize = QUEUE_SIZE_QUIZ_WORKFLOW;

/// Field-level defect of a received [`QuizSubmittedNotification`]
///
/// Names the first offending field. Always terminal for the message in
/// question: a payload that is invalid now will be invalid on every
/// redelivery as well.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventValidationError {
    /// A required string field was present but empty
    #[error("field {0} must not be empty")]
    EmptyField(&'static str),

    /// The score was negative
    #[error("field score must not be negative (got {0})")]
    NegativeScore(i64),
}

/// A learner submitted a quiz and received a score
///
/// Published by the quiz service after grading a submission. The payload is a
/// flat document; producers may attach additional fields (older versions send
/// an `event_type` discriminator) which are ignored on this side to stay
/// compatible with already-queued messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizSubmittedNotification {
    /// Learner who submitted the quiz
    pub user_id: String,

    /// Course the quiz belongs to
    pub course_id: String,

    /// Identifier of the quiz within the course
    pub quiz_id: i64,

    /// Number of correctly answered questions
    pub score: i64,

    /// Opaque submission marker assigned by the producer
    ///
    /// Only ever compared for equality; two deliveries carrying the same
    /// marker describe the same submission.
    pub timestamp: String,
}

impl QuizSubmittedNotification {
    /// Checks the field-level requirements that the wire format itself can not express
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.user_id.is_empty() {
            return Err(EventValidationError::EmptyField("user_id"));
        }

        if self.course_id.is_empty() {
            return Err(EventValidationError::EmptyField("course_id"));
        }

        if self.timestamp.is_empty() {
            return Err(EventValidationError::EmptyField("timestamp"));
        }

        if self.score < 0 {
            return Err(EventValidationError::NegativeScore(self.score));
        }

        Ok(())
    }
}

impl Notification for QuizSubmittedNotification {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(QUEUE_KEY.into(), QUEUE_SIZE)
    }
}

#[cfg(test)]
mod does {
    use super::*;

    fn submission() -> QuizSubmittedNotification {
        QuizSubmittedNotification {
            user_id: "u1".into(),
            course_id: "c1".into(),
            quiz_id: 7,
            score: 3,
            timestamp: "t1".into(),
        }
    }

    #[test]
    fn parse_a_producer_payload() {
        let parsed: QuizSubmittedNotification = serde_json::from_str(
            r#"{
                "event_type": "quiz_submitted",
                "user_id": "u1",
                "course_id": "c1",
                "quiz_id": 7,
                "score": 3,
                "timestamp": "t1"
            }"#,
        )
        .unwrap();

        assert_eq!(parsed, submission());
    }

    #[test]
    fn reject_a_payload_without_a_score() {
        let result = serde_json::from_str::<QuizSubmittedNotification>(
            r#"{"user_id": "u1", "course_id": "c1", "quiz_id": 7, "timestamp": "t1"}"#,
        );

        let message = result.unwrap_err().to_string();
        assert!(message.contains("score"), "unhelpful error: {}", message);
    }

    #[test]
    fn accept_a_valid_submission() {
        assert_eq!(submission().validate(), Ok(()));
    }

    #[test]
    fn name_the_first_empty_field() {
        let mut event = submission();
        event.user_id = "".into();
        event.course_id = "".into();

        assert_eq!(
            event.validate(),
            Err(EventValidationError::EmptyField("user_id"))
        );
    }

    #[test]
    fn reject_an_empty_timestamp() {
        let mut event = submission();
        event.timestamp = "".into();

        assert_eq!(
            event.validate(),
            Err(EventValidationError::EmptyField("timestamp"))
        );
    }

    #[test]
    fn reject_a_negative_score() {
        let mut event = submission();
        event.score = -2;

        assert_eq!(event.validate(), Err(EventValidationError::NegativeScore(-2)));
    }
}
