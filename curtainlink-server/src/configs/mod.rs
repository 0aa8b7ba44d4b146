mod profile;
mod settings;
mod storage;

pub use profile::{CurtainProfile, HubConfig, parse_code, parse_identity};
pub use settings::{Curtain, Database, Hub, Logger, Server, Settings};
pub use storage::Storage;
