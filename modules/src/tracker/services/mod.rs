mod submission;

pub use submission::SubmissionWatcherService;
