use async_trait::async_trait;
use domain::event::{EventValidationError, QuizSubmittedNotification};
use domain::{Attempt, MergeOutcome, ProgressRecord};
use harness::Service;
use library::communication::event::Consumer;
use library::communication::CommunicationFactory;
use library::EmptyResult;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::super::retry::{with_retry, RetryPolicy};
use super::super::store::{ProgressStore, StoreError};

#[derive(Debug, Error)]
enum SubmissionError {
    #[error("received an invalid submission event")]
    Validation(#[from] EventValidationError),

    #[error("progress store rejected the update")]
    Store(#[from] StoreError),
}

/// Maintains the progress record of a learner within a course
///
/// Consumes:
/// - [`QuizSubmittedNotification`]
///
/// For every event the full record is loaded, the attempt merged in (or
/// skipped when its submission marker was already recorded) and the result
/// written back as one upsert. Store failures are retried with backoff
/// before the event is handed back to the queue for redelivery.
pub struct SubmissionWatcherService<S> {
    store: S,
    retry_policy: RetryPolicy,
}

impl<F, S> Service<F> for SubmissionWatcherService<S>
where
    F: CommunicationFactory + Send + Sync,
    S: ProgressStore + Clone + Send + Sync,
{
    const NAME: &'static str = "SubmissionWatcherService";

    type Instance = SubmissionWatcherService<S>;
    type Config = (S, RetryPolicy);

    fn instantiate(_factory: F, config: &Self::Config) -> Self::Instance {
        Self {
            store: config.0.clone(),
            retry_policy: config.1,
        }
    }
}

impl<S> SubmissionWatcherService<S>
where
    S: ProgressStore + Send + Sync,
{
    async fn handle_event(
        &self,
        event: &QuizSubmittedNotification,
    ) -> Result<MergeOutcome, SubmissionError> {
        event.validate()?;

        let outcome = with_retry(&self.retry_policy, || self.merge_submission(event)).await?;

        Ok(outcome)
    }

    /// One logical read-modify-write against the store
    ///
    /// Re-run in full on every retry; the duplicate check keeps a re-run
    /// from applying the same attempt twice, no matter whether the previous
    /// attempt failed before or after its write took effect.
    async fn merge_submission(
        &self,
        event: &QuizSubmittedNotification,
    ) -> Result<MergeOutcome, StoreError> {
        let mut record = self
            .store
            .load(&event.user_id, &event.course_id)
            .await?
            .unwrap_or_else(|| {
                ProgressRecord::new(event.user_id.clone(), event.course_id.clone())
            });

        let attempt = Attempt {
            quiz_id: event.quiz_id,
            score: event.score,
            timestamp: event.timestamp.clone(),
        };

        match record.record_attempt(attempt) {
            MergeOutcome::Duplicate => Ok(MergeOutcome::Duplicate),
            MergeOutcome::Recorded => {
                self.store.persist(&record).await?;
                Ok(MergeOutcome::Recorded)
            }
        }
    }
}

#[async_trait]
impl<S> Consumer for SubmissionWatcherService<S>
where
    S: ProgressStore + Send + Sync,
{
    type Notification = QuizSubmittedNotification;

    #[instrument(skip(self, notification), fields(user = %notification.user_id, course = %notification.course_id))]
    async fn consume(&self, notification: Self::Notification) -> EmptyResult {
        debug!("Handling quiz submission");

        match self.handle_event(&notification).await {
            Ok(MergeOutcome::Recorded) => {
                info!("Progress record updated");
                Ok(())
            }
            Ok(MergeOutcome::Duplicate) => {
                info!("Submission already recorded, skipping");
                Ok(())
            }
            Err(SubmissionError::Validation(error)) => {
                // Terminal for this event; redelivering it would change nothing
                warn!(?error, "Discarding invalid submission event");
                Ok(())
            }
            Err(error @ SubmissionError::Store(_)) => {
                warn!(?error, "Progress update failed, submission will be redelivered");
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use library::communication::implementation::mock::MockCommunicationFactory;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemoryStore {
        records: Arc<Mutex<HashMap<(String, String), ProgressRecord>>>,
    }

    impl MemoryStore {
        fn record(&self, user_id: &str, course_id: &str) -> Option<ProgressRecord> {
            self.records
                .lock()
                .unwrap()
                .get(&(user_id.to_owned(), course_id.to_owned()))
                .cloned()
        }
    }

    #[async_trait]
    impl ProgressStore for MemoryStore {
        async fn load(
            &self,
            user_id: &str,
            course_id: &str,
        ) -> Result<Option<ProgressRecord>, StoreError> {
            Ok(self.record(user_id, course_id))
        }

        async fn persist(&self, record: &ProgressRecord) -> Result<(), StoreError> {
            self.records.lock().unwrap().insert(
                (record.user_id.clone(), record.course_id.clone()),
                record.clone(),
            );

            Ok(())
        }
    }

    /// Fails the first `failures` loads with a transient error, then behaves normally
    #[derive(Clone)]
    struct FlakyStore {
        inner: MemoryStore,
        remaining_failures: Arc<AtomicU32>,
    }

    impl FlakyStore {
        fn new(failures: u32) -> Self {
            Self {
                inner: MemoryStore::default(),
                remaining_failures: Arc::new(AtomicU32::new(failures)),
            }
        }

        fn transient_error() -> StoreError {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
            StoreError::Transient(mongodb::error::Error::from(io))
        }
    }

    #[async_trait]
    impl ProgressStore for FlakyStore {
        async fn load(
            &self,
            user_id: &str,
            course_id: &str,
        ) -> Result<Option<ProgressRecord>, StoreError> {
            let remaining = self.remaining_failures.load(Ordering::SeqCst);

            if remaining > 0 {
                self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
                return Err(FlakyStore::transient_error());
            }

            self.inner.load(user_id, course_id).await
        }

        async fn persist(&self, record: &ProgressRecord) -> Result<(), StoreError> {
            self.inner.persist(record).await
        }
    }

    fn submission(score: i64, timestamp: &str) -> QuizSubmittedNotification {
        QuizSubmittedNotification {
            user_id: "u1".into(),
            course_id: "c1".into(),
            quiz_id: 7,
            score,
            timestamp: timestamp.into(),
        }
    }

    fn service<S: ProgressStore + Clone + Send + Sync>(
        store: S,
    ) -> SubmissionWatcherService<S> {
        SubmissionWatcherService::instantiate(
            MockCommunicationFactory::default(),
            &(store, RetryPolicy::default()),
        )
    }

    #[tokio::test]
    async fn create_a_record_for_the_first_submission() {
        let store = MemoryStore::default();
        let watcher = service(store.clone());

        watcher.consume(submission(3, "t1")).await.unwrap();

        let record = store.record("u1", "c1").unwrap();
        assert_eq!(record.attempts.len(), 1);
        assert_eq!(record.attempts[0].quiz_id, 7);
        assert_eq!(record.total_attempts, 1);
        assert_eq!(record.best_score, Some(3));
        assert_eq!(record.last_score, Some(3));
        assert_eq!(record.average_score, Some(3.0));
        assert_eq!(record.improvement_percentage, Some(0.0));
    }

    #[tokio::test]
    async fn extend_the_record_with_a_second_submission() {
        let store = MemoryStore::default();
        let watcher = service(store.clone());

        watcher.consume(submission(3, "t1")).await.unwrap();
        watcher.consume(submission(9, "t2")).await.unwrap();

        let record = store.record("u1", "c1").unwrap();
        assert_eq!(record.attempts.len(), 2);
        assert_eq!(record.best_score, Some(9));
        assert_eq!(record.last_score, Some(9));
        assert_eq!(record.average_score, Some(6.0));
        assert_eq!(record.improvement_percentage, Some(200.0));
    }

    #[tokio::test]
    async fn leave_the_record_untouched_on_redelivery() {
        let store = MemoryStore::default();
        let watcher = service(store.clone());

        watcher.consume(submission(3, "t1")).await.unwrap();
        watcher.consume(submission(9, "t2")).await.unwrap();

        let before = store.record("u1", "c1").unwrap();

        // Same submission marker as the first event
        watcher.consume(submission(3, "t1")).await.unwrap();

        let after = store.record("u1", "c1").unwrap();
        assert_eq!(after, before);
        assert_eq!(after.attempts.len(), 2);
    }

    #[tokio::test]
    async fn keep_separate_records_per_learner_and_course() {
        let store = MemoryStore::default();
        let watcher = service(store.clone());

        let mut other_course = submission(5, "t1");
        other_course.course_id = "c2".into();

        watcher.consume(submission(3, "t1")).await.unwrap();
        watcher.consume(other_course).await.unwrap();

        assert_eq!(store.record("u1", "c1").unwrap().attempts.len(), 1);
        assert_eq!(store.record("u1", "c2").unwrap().attempts.len(), 1);
    }

    #[tokio::test]
    async fn discard_an_invalid_submission_without_touching_the_store() {
        let store = MemoryStore::default();
        let watcher = service(store.clone());

        let mut event = submission(3, "t1");
        event.user_id = "".into();

        watcher.consume(event).await.unwrap();

        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn recover_from_transient_store_failures_within_the_budget() {
        let store = FlakyStore::new(2);
        let watcher = service(store.clone());

        watcher.consume(submission(3, "t1")).await.unwrap();

        let record = store.inner.record("u1", "c1").unwrap();
        assert_eq!(record.attempts.len(), 1);
        assert_eq!(store.remaining_failures.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn surface_a_store_outage_once_retries_are_exhausted() {
        let store = FlakyStore::new(u32::MAX);
        let watcher = service(store.clone());

        let result = watcher.consume(submission(3, "t1")).await;

        assert!(result.is_err());
        assert!(store.inner.records.lock().unwrap().is_empty());
    }
}
