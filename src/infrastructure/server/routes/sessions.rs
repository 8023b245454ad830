use super::super::dto::{ErrorResponse, TranscriptResponse};
use super::super::error::ApiError;
use super::super::state::ServerState;
use crate::domain::SessionId;
use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "chat",
    params(("id" = String, Path, description = "Session id returned by an earlier request")),
    responses(
        (status = 200, description = "Transcript snapshot", body = TranscriptResponse),
        (status = 400, description = "Malformed session id", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn transcript_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let session_id = SessionId::parse(&id)?;
    let store = state.agent().store();
    if !store.contains(&session_id).await {
        return Err(ApiError::SessionNotFound(session_id.to_string()));
    }
    let turns = store.transcript(&session_id).await;
    debug!(session_id = %session_id, turns = turns.len(), "Serving transcript");
    Ok(Json(TranscriptResponse {
        session_id: session_id.to_string(),
        turns,
    }))
}
