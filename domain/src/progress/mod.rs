//! Per-learner, per-course progress aggregation

mod metrics;

pub use metrics::ProgressMetrics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One graded quiz submission, immutable once recorded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attempt {
    /// Identifier of the quiz within the course
    pub quiz_id: i64,

    /// Number of correctly answered questions
    pub score: i64,

    /// Opaque submission marker assigned by the producer, unique per submission
    pub timestamp: String,
}

/// Outcome of merging a submission into a [`ProgressRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The attempt was appended and the derived fields were recomputed
    Recorded,
    /// An attempt with the same submission marker already exists, nothing changed
    Duplicate,
}

/// Progress of one learner in one course
///
/// Exactly one record exists per `(user_id, course_id)` pair; the storage
/// layer enforces this with a unique compound index. The attempt list is
/// append-only in arrival order and never contains two attempts with the
/// same submission marker. All derived fields are recomputed from the full
/// attempt list on every mutation, never patched incrementally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressRecord {
    /// Learner this record belongs to
    pub user_id: String,

    /// Course this record belongs to
    pub course_id: String,

    /// Every recorded attempt in arrival order
    pub attempts: Vec<Attempt>,

    /// Number of recorded attempts
    pub total_attempts: i64,

    /// Score of the most recent attempt
    pub last_score: Option<i64>,

    /// Highest score across all attempts
    pub best_score: Option<i64>,

    /// Mean score across all attempts, rounded to two decimals
    pub average_score: Option<f64>,

    /// Relative score change from the first to the most recent attempt in
    /// percent, rounded to two decimals; `None` while no ratio can be formed
    pub improvement_percentage: Option<f64>,

    /// Instant of the last successful mutation
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Creates an empty record for the given pair
    pub fn new(user_id: String, course_id: String) -> Self {
        Self {
            user_id,
            course_id,
            attempts: Vec::new(),
            total_attempts: 0,
            last_score: None,
            best_score: None,
            average_score: None,
            improvement_percentage: None,
            updated_at: Utc::now(),
        }
    }

    /// Merges a submission into the record
    ///
    /// Appends the attempt and recomputes every derived field. If an attempt
    /// with the same submission marker was already recorded the record is
    /// left untouched, so applying the same submission twice yields the same
    /// record as applying it once.
    pub fn record_attempt(&mut self, attempt: Attempt) -> MergeOutcome {
        let duplicate = self
            .attempts
            .iter()
            .any(|existing| existing.timestamp == attempt.timestamp);

        if duplicate {
            return MergeOutcome::Duplicate;
        }

        self.attempts.push(attempt);
        self.apply_metrics();
        self.updated_at = Utc::now();

        MergeOutcome::Recorded
    }

    fn apply_metrics(&mut self) {
        let metrics = ProgressMetrics::compute(&self.attempts);

        self.total_attempts = metrics.total_attempts;
        self.last_score = metrics.last_score;
        self.best_score = metrics.best_score;
        self.average_score = metrics.average_score;
        self.improvement_percentage = metrics.improvement_percentage;
    }
}

#[cfg(test)]
mod does {
    use super::*;

    fn attempt(quiz_id: i64, score: i64, timestamp: &str) -> Attempt {
        Attempt {
            quiz_id,
            score,
            timestamp: timestamp.into(),
        }
    }

    #[test]
    fn aggregate_the_first_submission() {
        let mut record = ProgressRecord::new("u1".into(), "c1".into());

        assert_eq!(record.record_attempt(attempt(7, 3, "t1")), MergeOutcome::Recorded);

        assert_eq!(record.attempts, vec![attempt(7, 3, "t1")]);
        assert_eq!(record.total_attempts, 1);
        assert_eq!(record.last_score, Some(3));
        assert_eq!(record.best_score, Some(3));
        assert_eq!(record.average_score, Some(3.0));
        assert_eq!(record.improvement_percentage, Some(0.0));
    }

    #[test]
    fn aggregate_a_follow_up_submission() {
        let mut record = ProgressRecord::new("u1".into(), "c1".into());
        record.record_attempt(attempt(7, 3, "t1"));

        assert_eq!(record.record_attempt(attempt(7, 9, "t2")), MergeOutcome::Recorded);

        assert_eq!(record.total_attempts, 2);
        assert_eq!(record.last_score, Some(9));
        assert_eq!(record.best_score, Some(9));
        assert_eq!(record.average_score, Some(6.0));
        assert_eq!(record.improvement_percentage, Some(200.0));
    }

    #[test]
    fn suppress_a_redelivered_submission() {
        let mut record = ProgressRecord::new("u1".into(), "c1".into());
        record.record_attempt(attempt(7, 3, "t1"));
        record.record_attempt(attempt(7, 9, "t2"));

        let snapshot = record.clone();

        assert_eq!(record.record_attempt(attempt(7, 3, "t1")), MergeOutcome::Duplicate);

        assert_eq!(record.attempts, snapshot.attempts);
        assert_eq!(record.total_attempts, 2);
        assert_eq!(record.updated_at, snapshot.updated_at);
    }

    #[test]
    fn keep_attempts_in_arrival_order() {
        let mut record = ProgressRecord::new("u1".into(), "c1".into());
        record.record_attempt(attempt(1, 5, "t3"));
        record.record_attempt(attempt(2, 1, "t1"));
        record.record_attempt(attempt(3, 4, "t2"));

        let markers: Vec<_> = record
            .attempts
            .iter()
            .map(|a| a.timestamp.as_str())
            .collect();

        assert_eq!(markers, vec!["t3", "t1", "t2"]);
        assert_eq!(record.last_score, Some(4));
    }

    #[test]
    fn survive_an_encoding_round_trip() {
        let mut record = ProgressRecord::new("u1".into(), "c1".into());
        record.record_attempt(attempt(7, 3, "t1"));
        record.record_attempt(attempt(8, 9, "t2"));

        let encoded = serde_json::to_string(&record).unwrap();
        let decoded: ProgressRecord = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, record);

        let recomputed = ProgressMetrics::compute(&decoded.attempts);
        assert_eq!(recomputed.total_attempts, decoded.total_attempts);
        assert_eq!(recomputed.last_score, decoded.last_score);
        assert_eq!(recomputed.best_score, decoded.best_score);
        assert_eq!(recomputed.average_score, decoded.average_score);
        assert_eq!(recomputed.improvement_percentage, decoded.improvement_percentage);
    }
}
