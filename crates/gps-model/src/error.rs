use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {kind}: {value:?}")]
    InvalidId { kind: &'static str, value: String },
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),
    #[error("unknown metric category: {0}")]
    UnknownCategory(String),
    #[error("malformed stored report: {0}")]
    StoredPayload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
