//! Gemini client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::ModelProvider;
use super::types::ModelError;
use crate::config::AppConfig;

const PROVIDER_ID: &str = "gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client for Google AI
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    api_path: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_path: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self::with_client(Client::new(), endpoint, api_path, model, api_key)
    }

    pub fn with_client(
        http: Client,
        endpoint: impl Into<String>,
        api_path: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_path: api_path.into(),
            model: model.into(),
            api_key,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ModelError> {
        // Slightly above the per-round limit so the orchestration timeout fires first.
        let http = Client::builder()
            .timeout(config.model_timeout + Duration::from_secs(5))
            .build()
            .map_err(|e| ModelError::network(PROVIDER_ID, e))?;
        Ok(Self::with_client(
            http,
            config.endpoint.clone(),
            config.api_path.clone(),
            config.model.clone(),
            config.api_key.clone(),
        ))
    }

    fn build_model_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = self.api_path.trim_matches('/');
        format!("{base}/{path}/{}:generateContent", self.model)
    }

    fn require_api_key(&self) -> Result<&str, ModelError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ModelError::missing_api_key(PROVIDER_ID))
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let api_key = self.require_api_key()?;
        let url = self.build_model_url();
        let payload = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ]
        });

        info!(
            model = self.model.as_str(),
            prompt_chars = prompt.len(),
            "Sending request to Gemini"
        );

        let response: GeminiResponse = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ModelError::network(PROVIDER_ID, e))?
            .error_for_status()
            .map_err(|e| ModelError::network(PROVIDER_ID, e))?
            .json()
            .await
            .map_err(|e| ModelError::network(PROVIDER_ID, e))?;
        debug!("Received response from Gemini");

        response.into_text()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

impl GeminiResponse {
    fn into_text(self) -> Result<String, ModelError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ModelError::invalid_response(
                PROVIDER_ID,
                format!("prompt blocked: {reason}"),
            ));
        }

        let text: String = self
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ModelError::invalid_response(PROVIDER_ID, "missing text"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_url_joins_segments() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com/",
            "/v1beta/models/",
            "gemini-2.0-flash",
            None,
        );
        assert_eq!(
            client.build_model_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "TOOL: youtube_scraper\n" }, { "text": "PARAMS: {}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .expect("decode");
        assert_eq!(
            response.into_text().expect("text"),
            "TOOL: youtube_scraper\nPARAMS: {}"
        );
    }

    #[test]
    fn blocked_or_empty_responses_are_invalid() {
        let blocked: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .expect("decode");
        assert!(matches!(
            blocked.into_text(),
            Err(ModelError::InvalidResponse { reason, .. }) if reason.contains("SAFETY")
        ));

        let empty: GeminiResponse = serde_json::from_value(json!({ "candidates": [] })).expect("decode");
        assert!(empty.into_text().is_err());
    }

    #[tokio::test]
    async fn dropped_connections_never_expose_the_api_key() {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut buf).await.expect("read");
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }
            String::from_utf8_lossy(&request).into_owned()
        });

        let client = GeminiClient::new(
            format!("http://{addr}"),
            "v1beta/models",
            "m",
            Some("SECRET_KEY_123".into()),
        );
        let err = client.generate("hi").await.expect_err("socket closed");
        let head = server.await.expect("server task");

        let request_line = head.lines().next().unwrap_or_default();
        assert!(!request_line.contains("SECRET_KEY_123"), "{request_line}");
        assert!(head.to_ascii_lowercase().contains("x-goog-api-key: secret_key_123"));

        assert!(matches!(err, ModelError::Network { .. }));
        let message = err.user_message();
        assert!(message.starts_with("Error:"), "{message}");
        assert!(!message.contains("SECRET_KEY_123"), "{message}");
        assert!(!err.to_string().contains("SECRET_KEY_123"), "{err}");
        assert!(!format!("{err:?}").contains("SECRET_KEY_123"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new("http://127.0.0.1:9", "v1beta/models", "m", Some("  ".into()));
        let err = client.generate("hi").await.expect_err("no key");
        assert!(matches!(err, ModelError::MissingApiKey { .. }));
    }
}
