use std::path::PathBuf;

/// Errors raised while resolving files or talking to exiftool.
///
/// Every variant is fatal for the invocation: nothing is retried and no
/// partial result is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("exiftool could not be started from {}: {source}", .path.display())]
    EngineUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("exiftool terminated unexpectedly")]
    EngineTerminated,
    #[error("{message}")]
    EngineOperation {
        message: String,
        command_args: String,
    },
    #[error("unexpected exiftool output for {}", .path.display())]
    UnexpectedOutput { path: PathBuf },
    #[error("invalid file pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("argument {0:?} contains a line break")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
