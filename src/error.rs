use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the core operations.
///
/// Each variant is recoverable at the granularity of one input file: a caller
/// looping over many references can log the error and move on.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid parameters, e.g. a window no longer than k or indexes with different k
    #[error("Configuration error: {0}")]
    Config(String),

    /// Index file missing, unreadable or structurally invalid
    #[error("Index error: {0}")]
    Index(String),

    /// Sequence input empty or in an unrecognised format
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parallel task panicked
    #[error("Task {index} panicked: {message}")]
    Panic { index: usize, message: String },

    /// One or more parallel tasks failed; `first` is the lowest-indexed failure
    #[error("{failed} of {total} tasks failed; first failure: {first}")]
    Tasks {
        failed: usize,
        total: usize,
        first: Box<Error>,
    },
}

impl Error {
    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn index<S: Into<String>>(msg: S) -> Self {
        Error::Index(msg.into())
    }

    pub(crate) fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }
}
