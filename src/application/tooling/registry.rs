use super::interface::{ParamKind, ParamSpec, Tool};
use crate::application::tools;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),
    #[error("tool '{0}' is not registered")]
    NotFound(String),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

/// Startup-built, read-only catalogue of tools keyed by lowercase name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four content-strategy tools.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::new();
        let defaults: [Arc<dyn Tool>; 4] = [
            Arc::new(tools::YoutubeScraper),
            Arc::new(tools::ContentAnalyzer),
            Arc::new(tools::ContentGenerator),
            Arc::new(tools::PerformanceTracker),
        ];
        for tool in defaults {
            // Built-in names are distinct.
            let _ = registry.register(tool);
        }
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let key = tool.name().to_lowercase();
        if self.index.contains_key(&key) {
            return Err(RegistryError::Duplicate(tool.name().to_string()));
        }
        debug!(tool = tool.name(), "Registering tool");
        self.index.insert(key, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&slot| Arc::clone(&self.tools[slot]))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// `(name, description)` pairs in registration order.
    pub fn describe_all(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|tool| (tool.name().to_string(), tool.description().to_string()))
            .collect()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    /// Name of the first URL-shaped parameter the tool declares, if any.
    pub fn url_parameter(&self, name: &str) -> Option<String> {
        let tool = self.lookup(name).ok()?;
        tool.parameters()
            .into_iter()
            .find(|param| param.kind == ParamKind::Url)
            .map(|param| param.name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
