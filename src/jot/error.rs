use crate::limits::LimitError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JotError {
    #[error("Unsafe note name: {0:?}")]
    UnsafeName(String),

    #[error("Could not allocate a unique note name")]
    NamesExhausted,

    #[error("Note is locked: {0}")]
    Locked(String),

    #[error(transparent)]
    Limit(#[from] LimitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, JotError>;
