//! Manual injection of quiz submission events
//!
//! Publishes a single `quiz.submitted` event exactly the way the quiz
//! service does and exits. Useful to replay a submission that was lost on
//! the producing side or to exercise a deployment end to end without
//! driving the whole platform.

mod options;

use async_trait::async_trait;
use chrono::Utc;
use domain::event::QuizSubmittedNotification;
use harness::{DummyResourceHandleProvider, Heart, Module, RedisCommunicationFactory};
use jatsl::JobScheduler;
use library::communication::event::NotificationPublisher;
use library::communication::CommunicationFactory;
use library::BoxedError;
use tracing::info;

pub use options::Options;

/// Module implementation
pub struct Emitter {
    options: Options,
}

impl Emitter {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Emitter {
    async fn run(&mut self, _scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let factory = RedisCommunicationFactory::new(
            self.options.redis.url.clone(),
            DummyResourceHandleProvider::new(),
        );

        let notification = QuizSubmittedNotification {
            user_id: self.options.user.clone(),
            course_id: self.options.course.clone(),
            quiz_id: self.options.quiz,
            score: self.options.score,
            timestamp: self
                .options
                .timestamp
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
        };

        notification.validate()?;

        factory.notification_publisher().publish(&notification).await?;

        info!(
            user = %notification.user_id,
            course = %notification.course_id,
            quiz = notification.quiz_id,
            score = notification.score,
            "Published quiz submission event"
        );

        Ok(None)
    }
}
