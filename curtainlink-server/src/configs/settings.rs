use std::collections::HashSet;
use std::env;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::configs::profile::{CurtainProfile, HubConfig};
use crate::errors::ConfigError;

pub const DEFAULT_HUB_PORT: u16 = 80;
pub const DEFAULT_TIMEOUT: u64 = 5;
pub const DEFAULT_MOVE_TIME: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub url: String,
    #[serde(default)]
    pub clean_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hub {
    pub host: String,
    #[serde(default = "default_hub_port")]
    pub port: u16,
    /// MAC address of the hub, e.g. `aa:bb:cc:dd:ee:ff`
    pub identity: String,
    /// Connection and transmit timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curtain {
    pub name: String,
    pub open_code: String,
    pub close_code: String,
    pub stop_code: String,
    /// Full travel time in seconds; older configs call it `open_time`
    #[serde(default = "default_move_time", alias = "open_time")]
    pub move_time: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    pub hub: Hub,
    #[serde(default)]
    pub curtains: Vec<Curtain>,
}

fn default_hub_port() -> u16 {
    DEFAULT_HUB_PORT
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

fn default_move_time() -> u32 {
    DEFAULT_MOVE_TIME
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(
                Environment::with_prefix("CURTAINLINK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Checks the raw settings and decodes them into the types the controllers consume.
    pub fn validate(&self) -> Result<(HubConfig, Vec<CurtainProfile>), ConfigError> {
        let hub = HubConfig::try_from(&self.hub)?;

        let mut names = HashSet::new();
        let mut profiles = Vec::with_capacity(self.curtains.len());
        for curtain in &self.curtains {
            let profile = CurtainProfile::try_from(curtain)?;
            if !names.insert(profile.name.clone()) {
                return Err(ConfigError::DuplicateCurtain(profile.name));
            }
            profiles.push(profile);
        }

        Ok((hub, profiles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_from(source: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    const BASE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [logger]
        level = "debug"

        [database]
        url = "sqlite::memory:"

        [hub]
        host = "192.168.1.100"
        identity = "aa:bb:cc:dd:ee:ff"
    "#;

    #[test]
    fn test_defaults() {
        let settings = settings_from(BASE);

        assert_eq!(settings.hub.port, DEFAULT_HUB_PORT);
        assert_eq!(settings.hub.timeout, DEFAULT_TIMEOUT);
        assert!(!settings.database.clean_start);
        assert!(settings.curtains.is_empty());
    }

    #[test]
    fn test_legacy_open_time_key() {
        let source = format!(
            r#"{BASE}
            [[curtains]]
            name = "Living Room"
            open_code = "deadbeef"
            close_code = "beefdead"
            stop_code = "feedface"
            open_time = 45
            "#
        );
        let settings = settings_from(&source);

        assert_eq!(settings.curtains[0].move_time, 45);

        let (_, profiles) = settings.validate().unwrap();
        assert_eq!(profiles[0].move_time, 45);
        assert_eq!(profiles[0].open_code, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_duplicate_curtain_names() {
        let source = format!(
            r#"{BASE}
            [[curtains]]
            name = "Bedroom"
            open_code = "01"
            close_code = "02"
            stop_code = "03"

            [[curtains]]
            name = "Bedroom"
            open_code = "04"
            close_code = "05"
            stop_code = "06"
            "#
        );
        let settings = settings_from(&source);

        assert!(matches!(
            settings.validate(),
            Err(ConfigError::DuplicateCurtain(name)) if name == "Bedroom"
        ));
    }

    #[test]
    fn test_invalid_curtain_is_fatal() {
        let source = format!(
            r#"{BASE}
            [[curtains]]
            name = "Study"
            open_code = "abc"
            close_code = "02"
            stop_code = "03"
            move_time = 30
            "#
        );
        let settings = settings_from(&source);

        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidCode { field, .. }) if field == "open_code"
        ));
    }
}
