use std::sync::Arc;

use curtainlink_api::CurtainEvent;
use sqlx::Error;
use time::OffsetDateTime;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::models::CurtainStateRecord;
use crate::repositories::CurtainStateRepository;
use crate::services::CurtainController;

/// Keeps the last position of every curtain in storage.
#[derive(Clone)]
pub struct PersistenceService {
    repository: Arc<CurtainStateRepository>,
}

impl PersistenceService {
    pub fn new(repository: Arc<CurtainStateRepository>) -> Self {
        Self { repository }
    }

    /// Seeds a controller from its persisted row, if there is one.
    pub async fn restore(&self, controller: &CurtainController) -> Result<bool, Error> {
        let Some(record) = self.repository.find_by_name(controller.name()).await? else {
            return Ok(false);
        };

        let position = record.position.clamp(0, 100) as u8;
        controller.restore(position, record.last_manual_update).await;
        tracing::info!(curtain = controller.name(), position, "restored persisted state");

        Ok(true)
    }

    pub async fn find(&self, name: &str) -> Result<Option<CurtainStateRecord>, Error> {
        self.repository.find_by_name(name).await
    }

    pub async fn save(&self, event: &CurtainEvent) -> Result<(), Error> {
        let record = CurtainStateRecord {
            name: event.status.name.clone(),
            position: event.status.position as i64,
            last_manual_update: event.status.last_manual_update,
            updated_at: OffsetDateTime::now_utc(),
        };

        self.repository.upsert(&record).await
    }

    /// Writes the state left behind by every terminal event until the bus closes.
    pub fn start_listener(&self, mut receiver: broadcast::Receiver<CurtainEvent>) -> JoinHandle<()> {
        let service = self.clone();

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.kind.is_terminal() => {
                        if let Err(e) = service.save(&event).await {
                            tracing::error!(
                                curtain = %event.status.name,
                                "failed to persist curtain state: {}",
                                e
                            );
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("persistence listener lagged, skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            tracing::debug!("persistence listener stopped");
        })
    }
}
