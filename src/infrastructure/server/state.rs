use crate::application::agent::Agent;
use std::sync::Arc;

pub struct ServerState {
    agent: Arc<Agent>,
    api_key_configured: bool,
}

impl ServerState {
    pub fn new(agent: Arc<Agent>, api_key_configured: bool) -> Self {
        Self {
            agent,
            api_key_configured,
        }
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    pub fn api_key_configured(&self) -> bool {
        self.api_key_configured
    }
}
