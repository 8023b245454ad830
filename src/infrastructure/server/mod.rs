//! HTTP surface over the orchestration engine.

mod dto;
mod error;
mod routes;
mod state;

pub use dto::{AnalysisResponse, ChatResponse, ErrorResponse, HealthResponse, TranscriptResponse};
pub use error::{ApiError, ServerError};
pub use state::ServerState;

use crate::application::agent::{AgentStep, FinishReason};
use crate::application::tooling::{ParamKind, ParamSpec, ToolDescriptor};
use crate::domain::{Turn, TurnRole};
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use routes::{analysis, chat, sessions, system};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use utoipa::OpenApi;

const MIN_EVICTION_INTERVAL: Duration = Duration::from_secs(1);

#[derive(OpenApi)]
#[openapi(
    paths(
        system::health_handler,
        system::tools_handler,
        analysis::analyze_trending_handler,
        analysis::generate_content_handler,
        analysis::track_performance_handler,
        analysis::analyze_video_handler,
        chat::chat_handler,
        sessions::transcript_handler
    ),
    components(
        schemas(
            dto::HealthResponse,
            dto::ErrorResponse,
            dto::ToolListResponse,
            dto::AnalyzeTrendingRequest,
            dto::GenerateContentRequest,
            dto::TrackPerformanceRequest,
            dto::AnalyzeVideoRequest,
            dto::AnalysisResponse,
            dto::ChatRequest,
            dto::ChatResponse,
            dto::TranscriptResponse,
            ToolDescriptor,
            ParamSpec,
            ParamKind,
            AgentStep,
            FinishReason,
            Turn,
            TurnRole
        )
    ),
    tags(
        (name = "system", description = "Health and tool catalogue"),
        (name = "analysis", description = "Scripted content-strategy analyses"),
        (name = "chat", description = "Free-form questions and session transcripts")
    )
)]
struct ApiDoc;

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Internal server error: {detail}"),
        }),
    )
        .into_response()
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(system::health_handler))
        .route("/tools", get(system::tools_handler))
        .route("/analyze_trending", post(analysis::analyze_trending_handler))
        .route("/generate_content", post(analysis::generate_content_handler))
        .route("/track_performance", post(analysis::track_performance_handler))
        .route("/analyze_video", post(analysis::analyze_video_handler))
        .route("/chat", post(chat::chat_handler))
        .route("/sessions/{id}", get(sessions::transcript_handler))
        .route("/api-doc/openapi.json", get(openapi_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Periodically drops idle sessions from the agent's store.
fn spawn_session_eviction(state: &Arc<ServerState>, ttl: Duration) {
    let store = Arc::clone(state.agent().store());
    let period = (ttl / 2).max(MIN_EVICTION_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl).await;
            debug!(evicted, "Session eviction pass finished");
        }
    });
}

pub async fn serve(
    state: Arc<ServerState>,
    addr: SocketAddr,
    session_ttl: Option<Duration>,
) -> Result<(), ServerError> {
    info!(%addr, "Binding REST server");
    if let Some(ttl) = session_ttl {
        info!(ttl_secs = ttl.as_secs(), "Idle session eviction enabled");
        spawn_session_eviction(&state, ttl);
    }

    let app = router(state);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
