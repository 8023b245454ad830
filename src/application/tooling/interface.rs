use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

/// Shape of a declared tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Text,
    /// Absolute http(s) URL. Directive parsing isolates these directly.
    Url,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub description: String,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            description: description.to_string(),
        }
    }

    pub fn optional(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolFailure {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unavailable(String),
}

/// A named capability the model can request through a directive.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> Vec<ParamSpec>;

    async fn invoke(&self, params: Map<String, Value>) -> Result<Value, ToolFailure>;
}

/// Decodes named parameters into a tool's typed input.
pub fn decode_params<T: DeserializeOwned>(params: Map<String, Value>) -> Result<T, ToolFailure> {
    serde_json::from_value(Value::Object(params))
        .map_err(|e| ToolFailure::InvalidParameters(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Input {
        niche: String,
    }

    #[test]
    fn decode_reports_missing_and_unexpected_fields() {
        let err = decode_params::<Input>(Map::new()).expect_err("missing field");
        assert!(matches!(err, ToolFailure::InvalidParameters(ref msg) if msg.contains("niche")));

        let mut params = Map::new();
        params.insert("keyword".into(), json!("fitness"));
        let err = decode_params::<Input>(params).expect_err("unknown field");
        assert!(err.to_string().contains("keyword"));
    }
}
