use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid RF code for {field}: {reason}")]
    InvalidCode { field: String, reason: String },

    #[error("Move time {0}s is outside 1..=300")]
    InvalidMoveTime(u32),

    #[error("Connection timeout {0}s is outside 1..=60")]
    InvalidTimeout(u64),

    #[error("Invalid hub host: {0}")]
    InvalidHost(String),

    #[error("Invalid hub identity: {0}")]
    InvalidIdentity(String),

    #[error("Duplicate curtain name: {0}")]
    DuplicateCurtain(String),

    #[error("Failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),
}

impl ConfigError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConfigError::InvalidCode { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
