use async_trait::async_trait;
use domain::ProgressRecord;
use mongodb::bson::{self, doc};
use mongodb::options::UpdateOptions;
use mongodb::Collection;
use thiserror::Error;

/// Failure while talking to the progress store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store was unreachable, timed out or rejected the operation
    ///
    /// Worth retrying, since the next attempt may hit a recovered server.
    #[error("progress store communication failed")]
    Transient(#[from] mongodb::error::Error),
}

/// Storage for [`ProgressRecords`](ProgressRecord), keyed by learner and course
#[async_trait]
pub trait ProgressStore {
    /// Retrieves the record for the given pair, if one exists
    async fn load(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<ProgressRecord>, StoreError>;

    /// Writes the record, replacing an existing one for the same pair or
    /// creating it if absent
    async fn persist(&self, record: &ProgressRecord) -> Result<(), StoreError>;
}

/// MongoDB backed [`ProgressStore`]
///
/// Persists through a `$set` full-document replace with upsert semantics.
/// The collection carries a unique compound index on `(user_id, course_id)`,
/// so two instances racing to create the first record for a pair converge on
/// a single document and the loser's write turns into a plain update.
#[derive(Clone)]
pub struct MongoProgressStore {
    collection: Collection<ProgressRecord>,
}

impl MongoProgressStore {
    /// Creates a new instance on top of an existing collection handle
    pub fn new(collection: Collection<ProgressRecord>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl ProgressStore for MongoProgressStore {
    async fn load(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        let filter = doc! { "user_id": user_id, "course_id": course_id };

        Ok(self.collection.find_one(filter, None).await?)
    }

    async fn persist(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let filter = doc! { "user_id": &record.user_id, "course_id": &record.course_id };
        let document = bson::to_document(record).map_err(mongodb::error::Error::from)?;
        let options = UpdateOptions::builder().upsert(true).build();

        self.collection
            .update_one(filter, doc! { "$set": document }, options)
            .await?;

        Ok(())
    }
}
