use thiserror::Error;

/// Errors surfaced from [`crate::book::Book::cancel`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CancelError {
    #[error("order {0} not found")]
    NotFound(u64),
}

/// Errors surfaced from initializing the trade-log sink.
///
/// Fatal at CLI startup; a library embedder gets this back as a `Result`
/// instead of the process aborting.
#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("log directory does not exist or is not a directory: {0}")]
    NotADirectory(String),

    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),
}
