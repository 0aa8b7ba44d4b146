use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use curtainlink_api::transport::MAX_PAYLOAD_SIZE;

use crate::configs::settings::{Curtain, Hub};
use crate::errors::ConfigError;

pub const MAX_MOVE_TIME: u32 = 300;
pub const MAX_TIMEOUT: u64 = 60;

/// Validated hub connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub host: Ipv4Addr,
    pub port: u16,
    pub identity: [u8; 6],
    pub timeout: Duration,
}

impl HubConfig {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.host, self.port))
    }
}

impl TryFrom<&Hub> for HubConfig {
    type Error = ConfigError;

    fn try_from(hub: &Hub) -> Result<Self, Self::Error> {
        let host = hub
            .host
            .trim()
            .parse::<Ipv4Addr>()
            .map_err(|_| ConfigError::InvalidHost(hub.host.clone()))?;

        if !(1..=MAX_TIMEOUT).contains(&hub.timeout) {
            return Err(ConfigError::InvalidTimeout(hub.timeout));
        }

        Ok(Self {
            host,
            port: hub.port,
            identity: parse_identity(&hub.identity)?,
            timeout: Duration::from_secs(hub.timeout),
        })
    }
}

/// Immutable description of one curtain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurtainProfile {
    pub name: String,
    pub open_code: Vec<u8>,
    pub close_code: Vec<u8>,
    pub stop_code: Vec<u8>,
    /// Seconds to travel the whole 0..=100 range
    pub move_time: u32,
}

impl CurtainProfile {
    pub fn full_travel(&self) -> Duration {
        Duration::from_secs(self.move_time as u64)
    }
}

impl TryFrom<&Curtain> for CurtainProfile {
    type Error = ConfigError;

    fn try_from(curtain: &Curtain) -> Result<Self, Self::Error> {
        if !(1..=MAX_MOVE_TIME).contains(&curtain.move_time) {
            return Err(ConfigError::InvalidMoveTime(curtain.move_time));
        }

        Ok(Self {
            name: curtain.name.clone(),
            open_code: parse_code("open_code", &curtain.open_code)?,
            close_code: parse_code("close_code", &curtain.close_code)?,
            stop_code: parse_code("stop_code", &curtain.stop_code)?,
            move_time: curtain.move_time,
        })
    }
}

/// Decodes a learned RF code from its hexadecimal form.
pub fn parse_code(field: &str, code: &str) -> Result<Vec<u8>, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidCode {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let code = code.trim();
    if code.is_empty() {
        return Err(invalid("code is empty"));
    }
    if code.len() % 2 != 0 {
        return Err(invalid("odd number of hex digits"));
    }
    if code.len() / 2 > MAX_PAYLOAD_SIZE {
        return Err(invalid(&format!("longer than {MAX_PAYLOAD_SIZE} bytes")));
    }

    hex::decode(code).map_err(|e| invalid(&e.to_string()))
}

/// Parses a MAC address written as hex pairs separated by `:` or `-`.
pub fn parse_identity(identity: &str) -> Result<[u8; 6], ConfigError> {
    let invalid = || ConfigError::InvalidIdentity(identity.to_string());

    let parts: Vec<&str> = identity.trim().split([':', '-']).collect();
    if parts.len() != 6 {
        return Err(invalid());
    }

    let mut octets = [0u8; 6];
    for (octet, part) in octets.iter_mut().zip(parts) {
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
    }

    Ok(octets)
}
