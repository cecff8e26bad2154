//! Typed error types for termigenius.

/// All errors produced by the termigenius library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "llm")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Core(#[from] termigenius_core::Error),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Llm(String),

    #[error("{0}")]
    Prompt(String),
}

impl From<requestty::ErrorKind> for Error {
    fn from(err: requestty::ErrorKind) -> Self {
        Self::Prompt(err.to_string())
    }
}

/// A `Result` alias where the error type is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
