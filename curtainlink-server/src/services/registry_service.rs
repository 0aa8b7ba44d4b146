use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use curtainlink_api::Id;
use tokio::sync::RwLock;

use crate::configs::CurtainProfile;
use crate::errors::CurtainError;
use crate::services::{CurtainController, EventBus, TransmitterClient};

/// Owns every controller of one hub, addressed by the id issued at registration.
pub struct CurtainRegistry {
    curtains: RwLock<BTreeMap<Id, CurtainController>>,
    next_id: AtomicU32,
    transmitter: Arc<TransmitterClient>,
    events: EventBus,
}

impl CurtainRegistry {
    pub fn new(transmitter: Arc<TransmitterClient>, events: EventBus) -> Self {
        Self {
            curtains: RwLock::new(BTreeMap::new()),
            next_id: AtomicU32::new(1),
            transmitter,
            events,
        }
    }

    pub fn transmitter(&self) -> &Arc<TransmitterClient> {
        &self.transmitter
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn register(&self, profile: CurtainProfile) -> CurtainController {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let controller = CurtainController::new(
            id,
            profile,
            self.transmitter.clone(),
            self.events.clone(),
        );

        self.curtains.write().await.insert(id, controller.clone());
        tracing::info!(curtain = controller.name(), id, "registered curtain");

        controller
    }

    pub async fn get(&self, id: Id) -> Result<CurtainController, CurtainError> {
        self.curtains
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CurtainError::NotFound(id))
    }

    /// All controllers in id order.
    pub async fn list(&self) -> Vec<CurtainController> {
        self.curtains.read().await.values().cloned().collect()
    }

    /// Cancels every active move and forgets all curtains.
    pub async fn shutdown_all(&self) {
        let curtains = std::mem::take(&mut *self.curtains.write().await);

        for controller in curtains.values() {
            controller.shutdown().await;
        }
        self.transmitter.disconnect().await;

        tracing::info!("shut down {} curtains", curtains.len());
    }
}
