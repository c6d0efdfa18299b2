use thiserror::Error;

#[derive(Debug, Error)]
pub enum DqError {
    #[error("config error: {0}")]
    Config(String),
    #[error("expression error: {0}")]
    Expression(String),
    #[error("unknown source: {0}")]
    SourceNotFound(String),
    #[error("fetch failed for {src}: {reason}")]
    Fetch { src: String, reason: String },
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DqError>;
