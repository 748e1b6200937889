use thiserror::Error;

#[derive(Debug, Error)]
pub enum FairbandError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient variation: {0}")]
    InsufficientVariation(String),

    #[error("Empty sample: {0}")]
    EmptySample(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FairbandError {
    fn from(e: serde_json::Error) -> Self {
        FairbandError::SerializationError(e.to_string())
    }
}
