use super::directive::{DirectiveParser, ParsedDirective};
use super::models::{AgentOutcome, AgentRequest, AgentStep, DEFAULT_MAX_ROUNDS, FinishReason};
use super::prompt::build_prompt;
use crate::application::conversation::ConversationStore;
use crate::application::tooling::{ToolDispatcher, ToolInvocationResult, ToolRegistry};
use crate::config::AppConfig;
use crate::domain::Turn;
use crate::model::{ModelError, ModelProvider};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub max_rounds: usize,
    pub model_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            model_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&AppConfig> for AgentOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_rounds: config.max_rounds,
            model_timeout: config.model_timeout,
            tool_timeout: config.tool_timeout,
        }
    }
}

enum LoopState {
    AwaitingModel {
        round: usize,
    },
    HasDirective {
        round: usize,
        directive: ParsedDirective,
    },
    Final {
        rounds: usize,
        response: String,
        reason: FinishReason,
    },
}

pub struct Agent {
    model: Arc<dyn ModelProvider>,
    registry: Arc<ToolRegistry>,
    parser: DirectiveParser,
    dispatcher: ToolDispatcher,
    store: Arc<ConversationStore>,
    max_rounds: usize,
    model_timeout: Duration,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        registry: Arc<ToolRegistry>,
        store: Arc<ConversationStore>,
        options: AgentOptions,
    ) -> Self {
        Self {
            parser: DirectiveParser::new(Arc::clone(&registry)),
            dispatcher: ToolDispatcher::new(Arc::clone(&registry), options.tool_timeout),
            model,
            registry,
            store,
            max_rounds: options.max_rounds.max(1),
            model_timeout: options.model_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Runs one orchestration. Every failure below this point ends up either
    /// in the transcript or in the response text.
    pub async fn run(&self, request: AgentRequest) -> AgentOutcome {
        let AgentRequest {
            session_id,
            prompt,
            follow_ups,
        } = request;
        let _session = self.store.lock_session(&session_id).await;
        info!(session_id = %session_id, model = self.model.id(), "Agent run started");

        self.store.append(&session_id, Turn::user(prompt)).await;
        let mut follow_ups = follow_ups.into_iter();
        let mut steps = Vec::new();
        let mut state = LoopState::AwaitingModel { round: 1 };

        loop {
            state = match state {
                LoopState::AwaitingModel { round } => {
                    let transcript = self.store.transcript(&session_id).await;
                    let prompt = build_prompt(&self.registry, &transcript);
                    debug!(
                        session_id = %session_id,
                        round,
                        turns = transcript.len(),
                        prompt_chars = prompt.len(),
                        "Submitting round to model"
                    );

                    match self.call_model(&prompt).await {
                        Err(err) => {
                            error!(session_id = %session_id, round, error = %err, "Model call failed");
                            LoopState::Final {
                                rounds: round,
                                response: err.user_message(),
                                reason: FinishReason::ModelFailure,
                            }
                        }
                        Ok(reply) => {
                            self.store
                                .append(&session_id, Turn::assistant(reply.clone()))
                                .await;
                            self.next_state(round, reply)
                        }
                    }
                }
                LoopState::HasDirective { round, directive } => {
                    info!(
                        session_id = %session_id,
                        round,
                        tool = %directive.tool_name,
                        "Agent requested tool execution"
                    );
                    let result = self.dispatcher.dispatch(&directive).await;
                    self.store
                        .append(&session_id, Turn::tool_result(result.to_turn_text()))
                        .await;
                    steps.push(step(round, directive, result));

                    if let Some(follow_up) = follow_ups.next() {
                        debug!(session_id = %session_id, round, "Appending follow-up prompt");
                        self.store.append(&session_id, Turn::user(follow_up)).await;
                    }
                    LoopState::AwaitingModel { round: round + 1 }
                }
                LoopState::Final {
                    rounds,
                    response,
                    reason,
                } => {
                    info!(
                        session_id = %session_id,
                        rounds,
                        finish_reason = ?reason,
                        tool_calls = steps.len(),
                        "Agent run finished"
                    );
                    return AgentOutcome {
                        session_id,
                        response,
                        rounds,
                        finish_reason: reason,
                        steps,
                    };
                }
            };
        }
    }

    async fn call_model(&self, prompt: &str) -> Result<String, ModelError> {
        match tokio::time::timeout(self.model_timeout, self.model.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::timeout(self.model.id(), self.model_timeout)),
        }
    }

    fn next_state(&self, round: usize, reply: String) -> LoopState {
        let directive = match self.parser.parse(&reply) {
            Ok(directive) => directive,
            Err(err) => {
                warn!(round, error = %err, "Ignoring unparsable tool directive");
                None
            }
        };
        match directive {
            None => LoopState::Final {
                rounds: round,
                response: reply,
                reason: FinishReason::Answered,
            },
            Some(directive) if round < self.max_rounds => {
                LoopState::HasDirective { round, directive }
            }
            Some(directive) => {
                warn!(
                    round,
                    tool = %directive.tool_name,
                    "Round limit reached; returning latest reply"
                );
                LoopState::Final {
                    rounds: round,
                    response: reply,
                    reason: FinishReason::RoundLimit,
                }
            }
        }
    }
}

fn step(round: usize, directive: ParsedDirective, result: ToolInvocationResult) -> AgentStep {
    let (success, output, message) = match result {
        ToolInvocationResult::Success { output, .. } => (true, output, None),
        ToolInvocationResult::Failure { message, .. } => (false, Value::Null, Some(message)),
    };
    AgentStep {
        round,
        tool: directive.tool_name,
        parameters: Value::Object(directive.parameters),
        recovered_by: directive.recovered_by,
        success,
        output,
        message,
    }
}
