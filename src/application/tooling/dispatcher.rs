use super::registry::ToolRegistry;
use crate::application::agent::ParsedDirective;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ToolErrorKind {
    UnknownTool,
    ToolExecutionError,
}

/// Uniform envelope for one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolInvocationResult {
    Success {
        tool: String,
        output: Value,
    },
    Failure {
        tool: String,
        error_kind: ToolErrorKind,
        message: String,
    },
}

impl ToolInvocationResult {
    pub fn tool(&self) -> &str {
        match self {
            Self::Success { tool, .. } | Self::Failure { tool, .. } => tool,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// JSON text stored as the `tool_result` turn.
    pub fn to_turn_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            json!({ "tool": self.tool(), "status": "failure", "message": "unserializable tool output" })
                .to_string()
        })
    }
}

pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Never fails: lookup misses, tool errors, panics and timeouts all come
    /// back as [`ToolInvocationResult::Failure`].
    pub async fn dispatch(&self, directive: &ParsedDirective) -> ToolInvocationResult {
        let requested = directive.tool_name.as_str();
        let tool = match self.registry.lookup(requested) {
            Ok(tool) => tool,
            Err(err) => {
                warn!(requested_tool = %requested, "Unknown tool requested by model");
                return ToolInvocationResult::Failure {
                    tool: requested.to_string(),
                    error_kind: ToolErrorKind::UnknownTool,
                    message: err.to_string(),
                };
            }
        };

        let name = tool.name().to_string();
        let params = directive.parameters.clone();
        let shown = serde_json::Value::Object(params.clone());
        debug!(tool = %name, params = %shown, "Dispatching tool");

        let mut handle = tokio::spawn(async move { tool.invoke(params).await });
        let outcome = match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(result)) => result.map_err(|failure| failure.to_string()),
            Ok(Err(join)) => Err(format!("tool task aborted: {join}")),
            Err(_) => {
                handle.abort();
                Err(format!("tool timed out after {}s", self.timeout.as_secs()))
            }
        };

        match outcome {
            Ok(output) => {
                info!(tool = %name, success = true, "Tool executed");
                ToolInvocationResult::Success { tool: name, output }
            }
            Err(message) => {
                warn!(tool = %name, error = %message, "Tool execution failed");
                ToolInvocationResult::Failure {
                    tool: name,
                    error_kind: ToolErrorKind::ToolExecutionError,
                    message: format!("Tool execution error: {message}"),
                }
            }
        }
    }
}
