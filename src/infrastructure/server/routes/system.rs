use super::super::dto::{HealthResponse, ToolListResponse};
use super::super::state::ServerState;
use axum::Json;
use axum::extract::State;
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Content strategist API is running".to_string(),
        api_key_configured: state.api_key_configured(),
    })
}

#[utoipa::path(
    get,
    path = "/tools",
    tag = "system",
    responses(
        (status = 200, description = "Registered tools with their parameters", body = ToolListResponse)
    )
)]
pub async fn tools_handler(State(state): State<Arc<ServerState>>) -> Json<ToolListResponse> {
    let tools = state.agent().registry().descriptors();
    debug!(tool_count = tools.len(), "Serving /tools request");
    Json(ToolListResponse { tools })
}
