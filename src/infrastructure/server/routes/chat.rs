use super::super::dto::{ChatRequest, ChatResponse, ErrorResponse};
use super::super::error::{ApiError, required};
use super::super::state::ServerState;
use crate::application::agent::AgentRequest;
use crate::domain::SessionId;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;
use tracing::info;

const CHAT_SESSION_PREFIX: &str = "chat";

#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer after at most the configured number of rounds", body = ChatResponse),
        (status = 400, description = "Missing prompt, invalid session id or malformed body", body = ErrorResponse)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload?;
    let prompt = required("prompt", &payload.prompt)?;
    let session_id = match payload.session_id.as_deref() {
        Some(raw) => SessionId::parse(raw)?,
        None => SessionId::generate(CHAT_SESSION_PREFIX),
    };
    info!(session_id = %session_id, "Received /chat request");

    let outcome = state
        .agent()
        .run(AgentRequest::new(session_id, prompt))
        .await;
    Ok(Json(outcome.into()))
}
