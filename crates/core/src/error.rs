use thiserror::Error;

#[derive(Error, Debug)]
pub enum TideError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TideError>;
