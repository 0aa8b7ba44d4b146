use axum::routing::get;
use axum::{Json, Router};
use curtainlink_api::models::*;
use utoipa::OpenApi;

use super::{control_handle, sse_handle};

#[derive(OpenApi)]
#[openapi(
    paths(
        control_handle::get_curtains,
        control_handle::get_curtain_by_id,
        control_handle::open_curtain,
        control_handle::close_curtain,
        control_handle::stop_curtain,
        control_handle::set_curtain_position,
        control_handle::sync_curtain_position,
        control_handle::test_curtain_code,
        control_handle::get_hub_status,
        sse_handle::sse_handler,
    ),
    components(schemas(
        CurtainStatus,
        MotionState,
        SetPositionRequest,
        SyncPositionRequest,
        TestCodeRequest,
        CodeKind,
        CommandResponse,
        HubStatus,
        HubStatusResponse,
        CurtainEvent,
        EventKind,
    )),
    tags(
        (name = "curtain", description = "Curtain position control"),
        (name = "hub", description = "RF hub diagnostics"),
        (name = "event", description = "Live curtain events"),
    )
)]
pub struct ApiDoc;

pub fn docs_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
