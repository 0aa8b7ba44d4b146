use std::sync::Arc;

use axum::Router;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{Settings, Storage};
use crate::handles::*;
use crate::repositories::CurtainStateRepository;
use crate::services::*;

/// Everything a running server owns.
pub struct AppContext {
    pub registry: Arc<CurtainRegistry>,
    pub manual_sync: Arc<ManualSync>,
    pub persistence: PersistenceService,
    pub events: EventBus,
    pub shutdown: Arc<watch::Sender<bool>>,
}

impl AppContext {
    /// Ends open event streams so graceful shutdown can drain connections.
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

pub async fn create_context(
    settings: &Settings,
    connector: Arc<dyn HubConnector>,
) -> anyhow::Result<AppContext> {
    let (hub, profiles) = settings.validate()?;

    let storage = Arc::new(Storage::new(&settings.database).await?);
    let persistence = PersistenceService::new(Arc::new(CurtainStateRepository::new(storage)));

    let events = EventBus::default();
    let transmitter = Arc::new(TransmitterClient::new(hub, connector));
    let registry = Arc::new(CurtainRegistry::new(transmitter, events.clone()));

    for profile in profiles {
        let controller = registry.register(profile).await;
        persistence.restore(&controller).await?;
    }
    persistence.start_listener(events.subscribe());

    let manual_sync = Arc::new(ManualSync::new(registry.clone()));

    Ok(AppContext {
        registry,
        manual_sync,
        persistence,
        events,
        shutdown: Arc::new(watch::Sender::new(false)),
    })
}

pub fn create_router(context: &AppContext) -> Router {
    let control = control_router(ControlState {
        registry: context.registry.clone(),
        manual_sync: context.manual_sync.clone(),
    });

    let sse = sse_router(SSEState {
        events: context.events.clone(),
        shutdown: context.shutdown.subscribe(),
    });

    Router::new()
        .merge(control)
        .merge(sse)
        .merge(docs_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
