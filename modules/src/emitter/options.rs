use crate::options::RedisOptions;
use structopt::StructOpt;

/// Options for the emitter module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub redis: RedisOptions,

    /// Learner the submission belongs to
    #[structopt(long, env = "USER_ID", value_name = "id")]
    pub user: String,

    /// Course the quiz belongs to
    #[structopt(long, env = "COURSE_ID", value_name = "id")]
    pub course: String,

    /// Identifier of the quiz within the course
    #[structopt(long, env = "QUIZ_ID", value_name = "id")]
    pub quiz: i64,

    /// Score awarded for the submission
    #[structopt(long, env = "SCORE", value_name = "points")]
    pub score: i64,

    /// Submission marker carried by the event.
    /// Defaults to the current time so that every invocation describes a
    /// distinct submission; pass the original marker to replay a lost event
    /// without the risk of recording it twice.
    #[structopt(long, env = "TIMESTAMP", value_name = "marker")]
    pub timestamp: Option<String>,
}
