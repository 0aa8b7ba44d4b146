use std::sync::Arc;

use curtainlink_api::{CurtainStatus, Id};
use time::OffsetDateTime;

use crate::errors::CurtainError;
use crate::services::CurtainRegistry;

/// Applies operator observations to the estimated position without moving anything.
pub struct ManualSync {
    registry: Arc<CurtainRegistry>,
}

impl ManualSync {
    pub fn new(registry: Arc<CurtainRegistry>) -> Self {
        Self { registry }
    }

    pub async fn sync_position(
        &self,
        id: Id,
        position: i64,
        timestamp: OffsetDateTime,
    ) -> Result<CurtainStatus, CurtainError> {
        let controller = self.registry.get(id).await?;
        controller.apply_manual_sync(position, timestamp).await
    }
}

#[cfg(test)]
mod tests {
    use curtainlink_api::MotionState;
    use time::macros::datetime;

    use crate::services::{EventBus, TransmitterClient};
    use crate::testing::{RecordingConnector, test_hub, test_profile};

    use super::*;

    #[tokio::test]
    async fn test_sync_position() {
        let connector = RecordingConnector::new();
        let transmitter = Arc::new(TransmitterClient::new(test_hub(), Arc::new(connector.clone())));
        let registry = Arc::new(CurtainRegistry::new(transmitter, EventBus::default()));
        let id = registry.register(test_profile("Hall", 30)).await.id();
        let manual_sync = ManualSync::new(registry.clone());
        let observed = datetime!(2024-06-01 12:00 UTC);

        let status = manual_sync.sync_position(id, 35, observed).await.unwrap();

        assert_eq!(status.position, 35);
        assert_eq!(status.motion_state, MotionState::Idle);
        assert_eq!(status.last_manual_update, Some(observed));
        assert!(connector.sent().is_empty());

        assert_eq!(
            manual_sync.sync_position(id, -5, observed).await,
            Err(CurtainError::InvalidPosition(-5))
        );
        assert_eq!(
            manual_sync.sync_position(99, 10, observed).await,
            Err(CurtainError::NotFound(99))
        );
    }
}
