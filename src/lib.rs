pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, conversation, playbook, tooling, tools};
pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use domain::types;
pub use infrastructure::{model, server};

use agent::{Agent, AgentOptions, AgentRequest};
use conversation::ConversationStore;
use domain::SessionId;
use model::{GeminiClient, ModelProvider};
use server::ServerState;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tooling::ToolRegistry;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const CLI_SESSION_PREFIX: &str = "cli";

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Starting content-strategist");
    debug!(command = ?cli.command, config = ?cli.config, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let config = AppConfig::load(config_path)?;
    if let Some(path) = config_path {
        info!(path = %path.display(), "Loaded configuration from file");
    } else {
        info!("Loaded configuration from default path or defaults");
    }
    if !config.api_key_configured() {
        warn!(
            variable = config.api_key_env.as_str(),
            "No API key configured; model calls will fail"
        );
    }

    let model: Arc<dyn ModelProvider> = Arc::new(GeminiClient::from_config(&config)?);
    let agent = Arc::new(build_agent(&config, model));

    match cli.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or(config.bind_addr);
            info!(addr = %addr, model = config.model.as_str(), "Starting REST server");
            let state = Arc::new(ServerState::new(agent, config.api_key_configured()));
            server::serve(state, addr, config.session_ttl).await?;
        }
        Command::Ask { session, prompt } => {
            let session_id = match session.as_deref() {
                Some(raw) => SessionId::parse(raw)?,
                None => SessionId::generate(CLI_SESSION_PREFIX),
            };
            info!(session_id = %session_id, "Running single orchestration");
            let outcome = agent
                .run(AgentRequest::new(session_id, prompt.join(" ")))
                .await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

/// Agent over the built-in tools with limits taken from `config`.
pub fn build_agent(config: &AppConfig, model: Arc<dyn ModelProvider>) -> Agent {
    let registry = Arc::new(ToolRegistry::with_default_tools());
    info!(
        tool_count = registry.len(),
        max_rounds = config.max_rounds,
        "Tool registry ready"
    );
    Agent::new(
        model,
        registry,
        Arc::new(ConversationStore::new()),
        AgentOptions::from(config),
    )
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
