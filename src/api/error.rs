use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("{field} must be a finite number")]
    NonFiniteInput { field: &'static str },

    #[error("invalid forecast payload: {0}")]
    InvalidPayload(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ForecastError {
    fn from(e: serde_json::Error) -> Self {
        ForecastError::Serialization(e.to_string())
    }
}
