use std::time::Duration;

use async_trait::async_trait;
use curtainlink_api::transport::{Frame, FrameError, HubLink, Opcode};
use embedded_io_adapters::tokio_1::FromTokio;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::configs::HubConfig;
use crate::errors::{ConnectError, TransmitError};
use crate::services::{HubConnector, HubSession};

/// Connects to a hub over TCP and authenticates with its identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpHubConnector;

#[async_trait]
impl HubConnector for TcpHubConnector {
    async fn connect(&self, hub: &HubConfig) -> Result<Box<dyn HubSession>, ConnectError> {
        let address = hub.address();

        let stream = timeout(hub.timeout, TcpStream::connect(address))
            .await
            .map_err(|_| ConnectError::Timeout)?
            .map_err(|e| ConnectError::Unreachable(e.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|e| ConnectError::Unreachable(e.to_string()))?;

        let mut link = HubLink::new(FromTokio::new(stream));

        let reply = timeout(hub.timeout, link.request(Opcode::Hello, &hub.identity))
            .await
            .map_err(|_| ConnectError::Timeout)?
            .map_err(|e| ConnectError::Protocol(e.to_string()))?;

        match reply.opcode {
            Opcode::Welcome => Ok(Box::new(TcpHubSession {
                link,
                timeout: hub.timeout,
            })),
            Opcode::Reject => Err(ConnectError::Rejected(reason(&reply))),
            other => Err(ConnectError::Protocol(format!(
                "expected Welcome, got {}",
                other.name()
            ))),
        }
    }
}

pub struct TcpHubSession {
    link: HubLink<FromTokio<TcpStream>>,
    timeout: Duration,
}

impl TcpHubSession {
    async fn exchange(&mut self, opcode: Opcode, payload: &[u8]) -> Result<Frame, TransmitError> {
        timeout(self.timeout, self.link.request(opcode, payload))
            .await
            .map_err(|_| TransmitError::Timeout)?
            .map_err(|e| match e {
                FrameError::UnexpectedEof => TransmitError::SessionInvalidated,
                other => TransmitError::Io(other.to_string()),
            })
    }
}

#[async_trait]
impl HubSession for TcpHubSession {
    async fn transmit(&mut self, payload: &[u8]) -> Result<(), TransmitError> {
        let reply = self.exchange(Opcode::Transmit, payload).await?;

        match reply.opcode {
            Opcode::Ack => Ok(()),
            Opcode::Nack => Err(TransmitError::Nack(reason(&reply))),
            other => Err(TransmitError::Io(format!("expected Ack, got {}", other.name()))),
        }
    }

    async fn ping(&mut self) -> Result<(), TransmitError> {
        let reply = self.exchange(Opcode::Ping, &[]).await?;

        match reply.opcode {
            Opcode::Pong => Ok(()),
            other => Err(TransmitError::Io(format!("expected Pong, got {}", other.name()))),
        }
    }
}

fn reason(frame: &Frame) -> String {
    String::from_utf8_lossy(&frame.payload).into_owned()
}
