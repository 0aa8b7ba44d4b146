use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use curtainlink_api::models::*;
use time::OffsetDateTime;

use crate::configs::parse_code;
use crate::errors::ApiError;
use crate::services::{CurtainRegistry, ManualSync};

#[derive(Clone)]
pub struct ControlState {
    pub registry: Arc<CurtainRegistry>,
    pub manual_sync: Arc<ManualSync>,
}

pub fn control_router(state: ControlState) -> Router {
    Router::new()
        .route("/api/curtains", get(get_curtains))
        .route("/api/curtains/:curtain_id", get(get_curtain_by_id))
        .route("/api/curtains/:curtain_id/open", post(open_curtain))
        .route("/api/curtains/:curtain_id/close", post(close_curtain))
        .route("/api/curtains/:curtain_id/stop", post(stop_curtain))
        .route("/api/curtains/:curtain_id/position", put(set_curtain_position))
        .route("/api/curtains/:curtain_id/sync", post(sync_curtain_position))
        .route("/api/curtains/:curtain_id/codes/test", post(test_curtain_code))
        .route("/api/hub/status", get(get_hub_status))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/curtains",
    tag = "curtain",
    responses(
        (status = 200, description = "Status of every configured curtain", body = Vec<CurtainStatus>)
    )
)]
pub async fn get_curtains(State(state): State<ControlState>) -> Json<Vec<CurtainStatus>> {
    let mut statuses = Vec::new();
    for controller in state.registry.list().await {
        statuses.push(controller.status().await);
    }

    Json(statuses)
}

#[utoipa::path(
    get,
    path = "/api/curtains/{curtain_id}",
    tag = "curtain",
    params(
        ("curtain_id" = u32, Path, description = "Curtain ID")
    ),
    responses(
        (status = 200, description = "Curtain status", body = CurtainStatus),
        (status = 404, description = "Curtain not found")
    )
)]
pub async fn get_curtain_by_id(
    State(state): State<ControlState>,
    Path(curtain_id): Path<Id>,
) -> Result<Json<CurtainStatus>, ApiError> {
    let controller = state.registry.get(curtain_id).await?;

    Ok(Json(controller.status().await))
}

#[utoipa::path(
    post,
    path = "/api/curtains/{curtain_id}/open",
    tag = "curtain",
    params(
        ("curtain_id" = u32, Path, description = "Curtain ID")
    ),
    responses(
        (status = 200, description = "Opening started", body = CurtainStatus),
        (status = 404, description = "Curtain not found"),
        (status = 502, description = "Hub did not accept the open code"),
        (status = 504, description = "Hub timed out")
    )
)]
pub async fn open_curtain(
    State(state): State<ControlState>,
    Path(curtain_id): Path<Id>,
) -> Result<Json<CurtainStatus>, ApiError> {
    let controller = state.registry.get(curtain_id).await?;
    controller.open().await?;

    Ok(Json(controller.status().await))
}

#[utoipa::path(
    post,
    path = "/api/curtains/{curtain_id}/close",
    tag = "curtain",
    params(
        ("curtain_id" = u32, Path, description = "Curtain ID")
    ),
    responses(
        (status = 200, description = "Closing started", body = CurtainStatus),
        (status = 404, description = "Curtain not found"),
        (status = 502, description = "Hub did not accept the close code"),
        (status = 504, description = "Hub timed out")
    )
)]
pub async fn close_curtain(
    State(state): State<ControlState>,
    Path(curtain_id): Path<Id>,
) -> Result<Json<CurtainStatus>, ApiError> {
    let controller = state.registry.get(curtain_id).await?;
    controller.close().await?;

    Ok(Json(controller.status().await))
}

#[utoipa::path(
    post,
    path = "/api/curtains/{curtain_id}/stop",
    tag = "curtain",
    params(
        ("curtain_id" = u32, Path, description = "Curtain ID")
    ),
    responses(
        (status = 200, description = "Curtain stopped or already idle", body = CurtainStatus),
        (status = 404, description = "Curtain not found")
    )
)]
pub async fn stop_curtain(
    State(state): State<ControlState>,
    Path(curtain_id): Path<Id>,
) -> Result<Json<CurtainStatus>, ApiError> {
    let controller = state.registry.get(curtain_id).await?;
    controller.stop().await;

    Ok(Json(controller.status().await))
}

#[utoipa::path(
    put,
    path = "/api/curtains/{curtain_id}/position",
    tag = "curtain",
    params(
        ("curtain_id" = u32, Path, description = "Curtain ID")
    ),
    request_body = SetPositionRequest,
    responses(
        (status = 200, description = "Move started or already at target", body = CurtainStatus),
        (status = 400, description = "Position outside 0..=100"),
        (status = 404, description = "Curtain not found"),
        (status = 502, description = "Hub did not accept the direction code"),
        (status = 504, description = "Hub timed out")
    )
)]
pub async fn set_curtain_position(
    State(state): State<ControlState>,
    Path(curtain_id): Path<Id>,
    Json(body): Json<SetPositionRequest>,
) -> Result<Json<CurtainStatus>, ApiError> {
    let controller = state.registry.get(curtain_id).await?;
    controller.set_position(body.position).await?;

    Ok(Json(controller.status().await))
}

#[utoipa::path(
    post,
    path = "/api/curtains/{curtain_id}/sync",
    tag = "curtain",
    params(
        ("curtain_id" = u32, Path, description = "Curtain ID")
    ),
    request_body = SyncPositionRequest,
    responses(
        (status = 200, description = "Estimated position overwritten", body = CurtainStatus),
        (status = 400, description = "Position outside 0..=100"),
        (status = 404, description = "Curtain not found")
    )
)]
pub async fn sync_curtain_position(
    State(state): State<ControlState>,
    Path(curtain_id): Path<Id>,
    Json(body): Json<SyncPositionRequest>,
) -> Result<Json<CurtainStatus>, ApiError> {
    let timestamp = body.timestamp.unwrap_or_else(OffsetDateTime::now_utc);
    let status = state
        .manual_sync
        .sync_position(curtain_id, body.position, timestamp)
        .await?;

    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/curtains/{curtain_id}/codes/test",
    tag = "curtain",
    params(
        ("curtain_id" = u32, Path, description = "Curtain ID")
    ),
    request_body = TestCodeRequest,
    responses(
        (status = 200, description = "Code delivered to the hub", body = CommandResponse),
        (status = 400, description = "Malformed code"),
        (status = 404, description = "Curtain not found"),
        (status = 502, description = "Hub did not accept the code"),
        (status = 504, description = "Hub timed out")
    )
)]
pub async fn test_curtain_code(
    State(state): State<ControlState>,
    Path(curtain_id): Path<Id>,
    Json(body): Json<TestCodeRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let controller = state.registry.get(curtain_id).await?;

    let field = match body.code_type {
        CodeKind::Open => "open_code",
        CodeKind::Close => "close_code",
        CodeKind::Stop => "stop_code",
    };
    let code = parse_code(field, &body.code)?;

    state.registry.transmitter().send_code(&code).await?;
    tracing::info!(curtain = controller.name(), "test {} delivered", field);

    Ok(Json(CommandResponse {
        message: format!("Transmitted {} for {}", field, controller.name()),
    }))
}

#[utoipa::path(
    get,
    path = "/api/hub/status",
    tag = "hub",
    responses(
        (status = 200, description = "Hub reachability", body = HubStatusResponse)
    )
)]
pub async fn get_hub_status(State(state): State<ControlState>) -> Json<HubStatusResponse> {
    let transmitter = state.registry.transmitter();

    Json(HubStatusResponse {
        address: transmitter.hub().address().to_string(),
        status: transmitter.status().await,
    })
}
