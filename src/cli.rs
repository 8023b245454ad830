use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(
    name = "content-strategist",
    version,
    about = "Content-strategy assistant that orchestrates a generative model and analysis tools"
)]
pub struct Cli {
    /// Configuration file (defaults to config/app.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the REST API server
    Serve {
        /// Bind address (overrides config if specified)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Run a single orchestration and print the outcome as JSON
    Ask {
        /// Continue an existing session
        #[arg(long)]
        session: Option<String>,
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
}
