//! Playbook endpoints. Each request runs on a fresh session.

use super::super::dto::{
    AnalysisResponse, AnalyzeTrendingRequest, AnalyzeVideoRequest, ErrorResponse,
    GenerateContentRequest, TrackPerformanceRequest,
};
use super::super::error::{ApiError, required};
use super::super::state::ServerState;
use crate::application::playbook::Playbook;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;
use tracing::info;

async fn run_playbook(state: &ServerState, playbook: Playbook) -> AnalysisResponse {
    let request = playbook.into_request();
    info!(session_id = %request.session_id, "Running playbook");
    let outcome = state.agent().run(request).await;
    AnalysisResponse::from_outcome(outcome)
}

#[utoipa::path(
    post,
    path = "/analyze_trending",
    tag = "analysis",
    request_body = AnalyzeTrendingRequest,
    responses(
        (status = 200, description = "Trend analysis for the niche", body = AnalysisResponse),
        (status = 400, description = "Missing niche or malformed body", body = ErrorResponse)
    )
)]
pub async fn analyze_trending_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<AnalyzeTrendingRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(payload) = payload?;
    let niche = required("niche", &payload.niche)?;
    info!(niche = %niche, "Received /analyze_trending request");
    Ok(Json(run_playbook(&state, Playbook::Trending { niche }).await))
}

#[utoipa::path(
    post,
    path = "/generate_content",
    tag = "analysis",
    request_body = GenerateContentRequest,
    responses(
        (status = 200, description = "Content ideas, scripts and thumbnails", body = AnalysisResponse),
        (status = 400, description = "Missing prompt or malformed body", body = ErrorResponse)
    )
)]
pub async fn generate_content_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<GenerateContentRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(payload) = payload?;
    let prompt = required("prompt", &payload.prompt)?;
    info!("Received /generate_content request");
    Ok(Json(run_playbook(&state, Playbook::Content { prompt }).await))
}

#[utoipa::path(
    post,
    path = "/track_performance",
    tag = "analysis",
    request_body = TrackPerformanceRequest,
    responses(
        (status = 200, description = "Performance review of the video", body = AnalysisResponse),
        (status = 400, description = "Missing video_url or malformed body", body = ErrorResponse)
    )
)]
pub async fn track_performance_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<TrackPerformanceRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(payload) = payload?;
    let video_url = required("video_url", &payload.video_url)?;
    info!(video_url = %video_url, "Received /track_performance request");
    Ok(Json(
        run_playbook(&state, Playbook::Performance { video_url }).await,
    ))
}

#[utoipa::path(
    post,
    path = "/analyze_video",
    tag = "analysis",
    request_body = AnalyzeVideoRequest,
    responses(
        (status = 200, description = "Review of the video and its metadata", body = AnalysisResponse),
        (status = 400, description = "Missing video_id or malformed body", body = ErrorResponse)
    )
)]
pub async fn analyze_video_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<AnalyzeVideoRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(payload) = payload?;
    let video_id = required("video_id", &payload.video_id)?;
    info!(video_id = %video_id, "Received /analyze_video request");
    let playbook = Playbook::Video {
        video_id: video_id.clone(),
        video_data: payload.video_data,
    };
    let mut response = run_playbook(&state, playbook).await;
    response.video_id = Some(video_id);
    Ok(Json(response))
}
