use axum::http::StatusCode;
use curtainlink_api::Id;

use super::TransmitterError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurtainError {
    #[error("Curtain {0} not found")]
    NotFound(Id),

    #[error("Position {0} is outside 0..=100")]
    InvalidPosition(i64),

    #[error("Move aborted: {0}")]
    Transmitter(#[from] TransmitterError),

    #[error("Command interrupted")]
    Interrupted,
}

impl CurtainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CurtainError::NotFound(_) => StatusCode::NOT_FOUND,
            CurtainError::InvalidPosition(_) => StatusCode::BAD_REQUEST,
            CurtainError::Transmitter(e) => e.status_code(),
            CurtainError::Interrupted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
