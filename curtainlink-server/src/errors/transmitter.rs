use axum::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("Hub connection timed out")]
    Timeout,

    #[error("Hub rejected identity: {0}")]
    Rejected(String),

    #[error("Hub unreachable: {0}")]
    Unreachable(String),

    #[error("Hub handshake failed: {0}")]
    Protocol(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransmitError {
    #[error("Transmit timed out")]
    Timeout,

    #[error("Hub session invalidated")]
    SessionInvalidated,

    #[error("Hub refused code: {0}")]
    Nack(String),

    #[error("Transmit failed: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransmitterError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Transmit(#[from] TransmitError),
}

impl TransmitterError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TransmitterError::Connect(ConnectError::Timeout)
            | TransmitterError::Transmit(TransmitError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}
