use crate::encoder::SchemaVersion;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Schema mismatch: model expects {expected}, vector was built against {actual}")]
    SchemaMismatch {
        expected: SchemaVersion,
        actual: SchemaVersion,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("No cluster model has been trained")]
    NotTrained,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
