//! Hub fakes shared by unit and integration tests.

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::configs::{CurtainProfile, HubConfig};
use crate::errors::{ConnectError, TransmitError};
use crate::services::{HubConnector, HubSession};

pub const OPEN_CODE: &[u8] = &[0xa1, 0x01];
pub const CLOSE_CODE: &[u8] = &[0xa1, 0x02];
pub const STOP_CODE: &[u8] = &[0xa1, 0x03];

pub fn test_hub() -> HubConfig {
    HubConfig {
        host: Ipv4Addr::LOCALHOST,
        port: 80,
        identity: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
        timeout: Duration::from_secs(5),
    }
}

pub fn test_profile(name: &str, move_time: u32) -> CurtainProfile {
    CurtainProfile {
        name: name.to_string(),
        open_code: OPEN_CODE.to_vec(),
        close_code: CLOSE_CODE.to_vec(),
        stop_code: STOP_CODE.to_vec(),
        move_time,
    }
}

#[derive(Default)]
struct Recording {
    sent: Vec<Vec<u8>>,
    connections: usize,
    failures: usize,
    refuse: bool,
    delay: Duration,
}

/// In-process hub that records every delivered code.
#[derive(Clone, Default)]
pub struct RecordingConnector {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codes delivered so far, in order.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.lock().sent.clone()
    }

    pub fn connections(&self) -> usize {
        self.lock().connections
    }

    /// Makes the next `count` transmits fail.
    pub fn fail_next(&self, count: usize) {
        self.lock().failures = count;
    }

    /// Makes every transmit take `delay` before the hub answers.
    pub fn delay_transmits(&self, delay: Duration) {
        self.lock().delay = delay;
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.lock().refuse = refuse;
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HubConnector for RecordingConnector {
    async fn connect(&self, _hub: &HubConfig) -> Result<Box<dyn HubSession>, ConnectError> {
        let mut recording = self.lock();
        if recording.refuse {
            return Err(ConnectError::Unreachable("connection refused".to_string()));
        }
        recording.connections += 1;

        Ok(Box::new(RecordingSession {
            connector: self.clone(),
        }))
    }
}

struct RecordingSession {
    connector: RecordingConnector,
}

#[async_trait]
impl HubSession for RecordingSession {
    async fn transmit(&mut self, payload: &[u8]) -> Result<(), TransmitError> {
        let delay = self.connector.lock().delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut recording = self.connector.lock();
        if recording.failures > 0 {
            recording.failures -= 1;
            return Err(TransmitError::Io("injected failure".to_string()));
        }
        recording.sent.push(payload.to_vec());

        Ok(())
    }

    async fn ping(&mut self) -> Result<(), TransmitError> {
        Ok(())
    }
}
