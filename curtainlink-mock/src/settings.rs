use std::error::Error;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hub {
    pub host: String,
    pub port: u16,
    /// MAC address clients must present in their greeting
    pub identity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub hub: Hub,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let settings: Settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/mock.toml"
        )))?;

        Ok(settings)
    }

    pub fn address(&self) -> Result<SocketAddr, Box<dyn Error>> {
        let ip_addr = self.hub.host.parse::<IpAddr>()?;
        Ok(SocketAddr::from((ip_addr, self.hub.port)))
    }

    pub fn identity(&self) -> Result<Vec<u8>, Box<dyn Error>> {
        let identity = hex::decode(self.hub.identity.replace([':', '-'], ""))?;
        if identity.len() != 6 {
            return Err(format!("identity {} is not a MAC address", self.hub.identity).into());
        }

        Ok(identity)
    }
}
