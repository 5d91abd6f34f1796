use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(
        "invalid match thresholds: need 0 <= review ({review}) <= confident ({confident}) <= 1"
    )]
    InvalidThresholds { confident: f64, review: f64 },

    #[error("invalid mapping memory: {0}")]
    Memory(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IdentityError>;
