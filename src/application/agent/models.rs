use super::directive::RecoveryStage;
use crate::domain::SessionId;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

pub const DEFAULT_MAX_ROUNDS: usize = 3;

/// One orchestration request on a session.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub session_id: SessionId,
    pub prompt: String,
    /// Asked after the tool result of round 1, round 2, ... in order.
    pub follow_ups: Vec<String>,
}

impl AgentRequest {
    pub fn new(session_id: SessionId, prompt: impl Into<String>) -> Self {
        Self {
            session_id,
            prompt: prompt.into(),
            follow_ups: Vec::new(),
        }
    }

    pub fn with_follow_ups<I, S>(mut self, follow_ups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.follow_ups = follow_ups.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model replied without a tool directive.
    Answered,
    /// The last permitted round still asked for a tool.
    RoundLimit,
    ModelFailure,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentStep {
    pub round: usize,
    pub tool: String,
    #[schema(value_type = Object)]
    pub parameters: Value,
    #[schema(value_type = Object)]
    pub recovered_by: RecoveryStage,
    pub success: bool,
    #[schema(value_type = Object)]
    pub output: Value,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentOutcome {
    #[schema(value_type = String)]
    pub session_id: SessionId,
    pub response: String,
    pub rounds: usize,
    pub finish_reason: FinishReason,
    pub steps: Vec<AgentStep>,
}
