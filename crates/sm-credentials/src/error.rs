use sm_types::SmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no topic for sensor {0}")]
    NotFound(String),

    #[error("sensor {0} already exists")]
    AlreadyExists(String),

    #[error("credential database is corrupt: {0}")]
    Corrupt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize credential database: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for SmError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(s) => SmError::NotFound(s),
            StoreError::AlreadyExists(s) => SmError::AlreadyExists(s),
            StoreError::Corrupt(s) => SmError::FatalInvariant(s),
            StoreError::Io(e) => SmError::Io(e),
            StoreError::Serialization(e) => SmError::ParseError(e.to_string()),
        }
    }
}
