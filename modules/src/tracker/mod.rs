//! Aggregates quiz submission events into durable progress records
//!
//! The platform's quiz service publishes a `quiz.submitted` event for every
//! graded submission. This module consumes those events one at a time and
//! maintains one record per learner and course, deduplicating redeliveries
//! by their submission marker so the at-least-once queue semantics never
//! inflate anybody's statistics.

mod options;
mod retry;
mod services;
mod store;

use async_trait::async_trait;
use harness::{Heart, Module, ServiceRunner};
use jatsl::{schedule, JobScheduler};
use library::communication::event::{
    ConsumerGroupDescriptor, ConsumerGroupIdentifier, QueueLocation,
};
use library::BoxedError;

pub use options::Options;
pub use retry::{with_retry, RetryPolicy};
pub use store::{MongoProgressStore, ProgressStore, StoreError};

use services::*;
use tracing::{debug, instrument};

/// Module implementation
pub struct Tracker {
    options: Options,
}

impl Tracker {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Tracker {
    #[instrument(skip(self, scheduler))]
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let redis_url = self.options.redis.url.clone();
        let group =
            ConsumerGroupDescriptor::new(ConsumerGroupIdentifier::Tracker, QueueLocation::Head);
        let consumer = self.options.queueing.id.to_string();

        debug!("Acquiring mongo connection");
        let database = self.options.mongo.database().await?;
        let collection = self.options.mongo.collection(&database).await?;
        let store = MongoProgressStore::new(collection);

        let submission_watcher = ServiceRunner::<SubmissionWatcherService<MongoProgressStore>>::new(
            redis_url,
            group,
            consumer,
            (store, RetryPolicy::default()),
        );

        debug!("Scheduling jobs");
        schedule!(scheduler, { submission_watcher });

        Ok(Some(Heart::without_heart_stone()))
    }
}
