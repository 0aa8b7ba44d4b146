use std::convert::Infallible;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use axum::routing::get;
use axum::Router;
use curtainlink_api::CurtainEvent;
use tokio::sync::watch;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_stream::{Stream, StreamExt};

use crate::services::EventBus;

#[derive(Clone)]
pub struct SSEState {
    pub events: EventBus,
    /// Flips to `true` once the server starts shutting down; open streams end then.
    pub shutdown: watch::Receiver<bool>,
}

pub fn sse_router(state: SSEState) -> Router {
    Router::new()
        .route("/api/events", get(sse_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "event",
    responses(
        (status = 200, description = "Stream of curtain events, named by kind", body = CurtainEvent, content_type = "text/event-stream")
    )
)]
pub async fn sse_handler(
    State(state): State<SSEState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();

    let events = BroadcastStream::new(receiver).filter_map(|result| {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("sse subscriber fell behind: {}", e);
                return None;
            }
        };

        match Event::default().event(event.kind.as_str()).json_data(&event) {
            Ok(sse_event) => Some(Some(sse_event)),
            Err(e) => {
                tracing::error!("failed to encode curtain event: {}", e);
                None
            }
        }
    });

    let closing = WatchStream::new(state.shutdown)
        .filter(|closing| *closing)
        .map(|_| None::<Event>);

    let stream = events
        .merge(closing)
        .take_while(Option::is_some)
        .filter_map(|item| item.map(Ok::<_, Infallible>));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
