use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pool is empty, every weight is 0, or the rotation scan ran out
    /// of steps. Callers are expected to branch on it.
    #[error("no backend available")]
    NoBackendAvailable,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("{0}")]
    Usage(String),
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Usage(message.to_owned())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
