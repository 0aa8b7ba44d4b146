use super::{ConfigError, CurtainError, TransmitterError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Curtain error: {0}")]
    CurtainError(#[from] CurtainError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Transmitter error: {0}")]
    TransmitterError(#[from] TransmitterError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
