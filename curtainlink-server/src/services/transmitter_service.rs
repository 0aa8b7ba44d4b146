use std::sync::Arc;

use async_trait::async_trait;
use curtainlink_api::HubStatus;
use tokio::sync::Mutex;

use crate::configs::HubConfig;
use crate::errors::{ConnectError, TransmitError, TransmitterError};

/// An authenticated session with an RF hub.
#[async_trait]
pub trait HubSession: Send {
    /// Replays an opaque RF code. Any error means the code was not delivered.
    async fn transmit(&mut self, payload: &[u8]) -> Result<(), TransmitError>;

    async fn ping(&mut self) -> Result<(), TransmitError>;
}

#[async_trait]
pub trait HubConnector: Send + Sync {
    async fn connect(&self, hub: &HubConfig) -> Result<Box<dyn HubSession>, ConnectError>;
}

/// Shared client for one hub, reconnecting lazily.
pub struct TransmitterClient {
    hub: HubConfig,
    connector: Arc<dyn HubConnector>,
    session: Mutex<Option<Box<dyn HubSession>>>,
}

impl TransmitterClient {
    pub fn new(hub: HubConfig, connector: Arc<dyn HubConnector>) -> Self {
        Self {
            hub,
            connector,
            session: Mutex::new(None),
        }
    }

    pub fn hub(&self) -> &HubConfig {
        &self.hub
    }

    /// Opens a session eagerly, replacing any existing one.
    pub async fn test_connection(&self) -> Result<(), ConnectError> {
        let mut session = self.session.lock().await;
        *session = None;
        *session = Some(self.connect().await?);
        Ok(())
    }

    /// Transmits a code, connecting first when no session is held.
    ///
    /// The session is out of the slot while a frame is in flight, so a failed
    /// or abandoned transmit leaves nothing behind and the next call reconnects.
    pub async fn send_code(&self, payload: &[u8]) -> Result<(), TransmitterError> {
        let mut guard = self.session.lock().await;

        let mut session = match guard.take() {
            Some(session) => session,
            None => self.connect().await?,
        };

        match session.transmit(payload).await {
            Ok(()) => {
                tracing::debug!("transmitted {} byte code to {}", payload.len(), self.hub.address());
                *guard = Some(session);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("transmit to {} failed, dropping session: {}", self.hub.address(), e);
                Err(e.into())
            }
        }
    }

    pub async fn status(&self) -> HubStatus {
        let mut guard = self.session.lock().await;

        let mut session = match guard.take() {
            Some(session) => session,
            None => match self.connect().await {
                Ok(session) => session,
                Err(ConnectError::Rejected(_) | ConnectError::Protocol(_)) => return HubStatus::Error,
                Err(_) => return HubStatus::Offline,
            },
        };

        match session.ping().await {
            Ok(()) => {
                *guard = Some(session);
                HubStatus::Online
            }
            Err(e) => {
                tracing::warn!("hub {} did not answer ping: {}", self.hub.address(), e);
                HubStatus::Offline
            }
        }
    }

    pub async fn disconnect(&self) {
        if self.session.lock().await.take().is_some() {
            tracing::info!("closed session with hub {}", self.hub.address());
        }
    }

    async fn connect(&self) -> Result<Box<dyn HubSession>, ConnectError> {
        let address = self.hub.address();
        tracing::info!("connecting to hub {}", address);

        match self.connector.connect(&self.hub).await {
            Ok(session) => {
                tracing::info!("hub {} accepted session", address);
                Ok(session)
            }
            Err(e) => {
                tracing::warn!("failed to connect to hub {}: {}", address, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::testing::{RecordingConnector, test_hub};

    use super::*;

    #[tokio::test]
    async fn test_connects_lazily_once() {
        let connector = RecordingConnector::new();
        let client = TransmitterClient::new(test_hub(), Arc::new(connector.clone()));

        assert_eq!(connector.connections(), 0);

        client.send_code(&[0x01]).await.unwrap();
        client.send_code(&[0x02]).await.unwrap();

        assert_eq!(connector.connections(), 1);
        assert_eq!(connector.sent(), vec![vec![0x01], vec![0x02]]);
    }

    #[tokio::test]
    async fn test_failed_transmit_invalidates_session() {
        let connector = RecordingConnector::new();
        let client = TransmitterClient::new(test_hub(), Arc::new(connector.clone()));

        client.send_code(&[0x01]).await.unwrap();
        connector.fail_next(1);

        let result = client.send_code(&[0x02]).await;
        assert!(matches!(result, Err(TransmitterError::Transmit(_))));
        assert_eq!(connector.connections(), 1);

        client.send_code(&[0x03]).await.unwrap();
        assert_eq!(connector.connections(), 2);
        assert_eq!(connector.sent(), vec![vec![0x01], vec![0x03]]);
    }

    #[tokio::test]
    async fn test_no_retry_within_call() {
        let connector = RecordingConnector::new();
        let client = TransmitterClient::new(test_hub(), Arc::new(connector.clone()));
        connector.fail_next(1);

        assert!(client.send_code(&[0x01]).await.is_err());
        assert!(connector.sent().is_empty());
        assert_eq!(connector.connections(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let connector = RecordingConnector::new();
        connector.refuse_connections(true);
        let client = TransmitterClient::new(test_hub(), Arc::new(connector.clone()));

        assert!(matches!(
            client.send_code(&[0x01]).await,
            Err(TransmitterError::Connect(ConnectError::Unreachable(_)))
        ));
        assert!(client.test_connection().await.is_err());
        assert_eq!(client.status().await, HubStatus::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_transmit_drops_session() {
        let connector = RecordingConnector::new();
        let client = TransmitterClient::new(test_hub(), Arc::new(connector.clone()));
        connector.delay_transmits(Duration::from_secs(3));

        let abandoned = tokio::time::timeout(Duration::from_secs(1), client.send_code(&[0x01])).await;
        assert!(abandoned.is_err());

        connector.delay_transmits(Duration::ZERO);
        client.send_code(&[0x02]).await.unwrap();

        assert_eq!(connector.connections(), 2);
        assert_eq!(connector.sent(), vec![vec![0x02]]);
    }

    #[tokio::test]
    async fn test_status_online() {
        let connector = RecordingConnector::new();
        let client = TransmitterClient::new(test_hub(), Arc::new(connector.clone()));

        assert_eq!(client.status().await, HubStatus::Online);

        client.disconnect().await;
        client.send_code(&[0x01]).await.unwrap();
        assert_eq!(connector.connections(), 2);
    }
}
