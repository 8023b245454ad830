use crate::application::agent::{AgentOutcome, AgentStep, FinishReason};
use crate::application::tooling::ToolDescriptor;
use crate::domain::Turn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub api_key_configured: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToolListResponse {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeTrendingRequest {
    #[serde(default)]
    pub niche: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateContentRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackPerformanceRequest {
    #[serde(default)]
    pub video_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeVideoRequest {
    #[serde(default)]
    pub video_id: String,
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub video_data: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub result: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl AnalysisResponse {
    pub fn from_outcome(outcome: AgentOutcome) -> Self {
        Self {
            result: outcome.response,
            session_id: outcome.session_id.to_string(),
            video_id: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub result: String,
    pub session_id: String,
    pub rounds: usize,
    pub finish_reason: FinishReason,
    pub steps: Vec<AgentStep>,
}

impl From<AgentOutcome> for ChatResponse {
    fn from(outcome: AgentOutcome) -> Self {
        Self {
            result: outcome.response,
            session_id: outcome.session_id.to_string(),
            rounds: outcome.rounds,
            finish_reason: outcome.finish_reason,
            steps: outcome.steps,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    pub session_id: String,
    pub turns: Vec<Turn>,
}
