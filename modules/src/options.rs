//! Various options usable by modules
//!
//! The structs in this module allow other modules to flatten them into
//! their own options struct. This allows for a unified yet non-cluttered
//! option set.

use domain::ProgressRecord;
use library::helpers::parse_seconds;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;
use structopt::StructOpt;
use tracing::trace;

/// Options for connecting to the Redis server
#[derive(Debug, StructOpt)]
pub struct RedisOptions {
    /// Redis database server URL
    #[structopt(
        short = "r",
        long = "redis",
        env = "REDIS",
        global = true,
        default_value = "redis://learnhub-redis/",
        value_name = "url"
    )]
    pub url: String,
}

/// Options relevant for message queueing
#[derive(Debug, StructOpt)]
pub struct QueueingOptions {
    /// Unique and stable identifier for this instance.
    /// It is used to identify and resume work after a crash
    /// or deliberate restart, thus it may not change across
    /// executions!
    #[structopt(env)]
    pub id: String,
}

/// Options regarding the permanent storage backend
#[derive(Debug, StructOpt)]
pub struct MongoDBOptions {
    /// MongoDB connection URL
    #[structopt(long, env, default_value = "mongodb://localhost:27017")]
    mongodb: String,

    /// Name of the database to use
    #[structopt(long, env, default_value = "learnhub")]
    database: String,

    /// Name of the collection where progress records are stored
    #[structopt(long, env, default_value = "progress")]
    collection: String,

    /// Upper bound in seconds for connecting to and selecting a database server.
    /// A store that does not answer within this window fails the operation
    /// instead of stalling the consumer indefinitely.
    #[structopt(long, env, default_value = "5", parse(try_from_str = parse_seconds))]
    operation_timeout: Duration,
}

impl MongoDBOptions {
    /// Instantiates a new database client instance
    pub async fn client(&self) -> mongodb::error::Result<Client> {
        let mut options = ClientOptions::parse(&self.mongodb).await?;
        options.connect_timeout = Some(self.operation_timeout);
        options.server_selection_timeout = Some(self.operation_timeout);

        Client::with_options(options)
    }

    /// Instantiates a new database connection based on a new client
    pub async fn database(&self) -> mongodb::error::Result<Database> {
        Ok(self.client().await?.database(&self.database))
    }

    /// Creates a new handle to the progress collection
    ///
    /// Ensures the unique compound index on `(user_id, course_id)` exists.
    /// The index is what keeps concurrent first-writes for the same pair
    /// from creating two records; writers rely on it instead of taking
    /// locks.
    pub async fn collection(
        &self,
        database: &Database,
    ) -> mongodb::error::Result<Collection<ProgressRecord>> {
        let collection = database.collection(&self.collection);

        let index_model = IndexModel::builder()
            .keys(mongodb::bson::doc! { "user_id": 1, "course_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        trace!("Ensuring that the unique pair index exists");
        collection.create_index(index_model, None).await?;

        Ok(collection)
    }
}
