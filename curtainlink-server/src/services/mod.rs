mod curtain_service;
mod event_bus;
mod hub_connector;
mod persistence_service;
mod registry_service;
mod sync_service;
mod transmitter_service;

pub use curtain_service::*;
pub use event_bus::*;
pub use hub_connector::*;
pub use persistence_service::*;
pub use registry_service::*;
pub use sync_service::*;
pub use transmitter_service::*;
