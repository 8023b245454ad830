mod directive;
mod models;
mod prompt;
mod repair;
mod runner;


pub use directive::{Directive, DirectiveError, DirectiveParser, ParsedDirective, RecoveryStage};
pub use models::{AgentOutcome, AgentRequest, AgentStep, DEFAULT_MAX_ROUNDS, FinishReason};
pub use prompt::build_prompt;
pub use repair::RepairRule;
pub use runner::{Agent, AgentOptions};
