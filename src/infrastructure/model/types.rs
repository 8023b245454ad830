//! Model error type shared by every provider.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("provider '{provider}' did not answer within {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    /// The request URL is dropped from `source`; it never reaches logs or answers.
    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source: source.without_url(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            provider: provider.into(),
            timeout,
        }
    }

    /// Answer text surfaced to the caller when a round ends on a model failure.
    pub fn user_message(&self) -> String {
        match self {
            ModelError::MissingApiKey { provider } => format!(
                "Error: the '{provider}' model is not configured with an API key, so no analysis could be produced."
            ),
            ModelError::Network { provider, source } => {
                if source.is_connect() {
                    format!("Error: could not connect to the '{provider}' model service.")
                } else if source.is_timeout() {
                    format!("Error: the request to '{provider}' timed out.")
                } else if let Some(status) = source.status() {
                    match status {
                        StatusCode::TOO_MANY_REQUESTS => {
                            format!("Error: the '{provider}' quota is exhausted; try again later.")
                        }
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            format!("Error: '{provider}' rejected the configured API key.")
                        }
                        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                            format!("Error: '{provider}' is temporarily unavailable.")
                        }
                        _ => format!(
                            "Error: the request to '{provider}' failed with status {}.",
                            status.as_u16()
                        ),
                    }
                } else {
                    format!("Error: network failure while calling '{provider}'.")
                }
            }
            ModelError::InvalidResponse { provider, reason } => {
                format!("Error: '{provider}' returned a response that could not be read ({reason}).")
            }
            ModelError::Timeout { provider, timeout } => format!(
                "Error: '{provider}' did not answer within {} seconds.",
                timeout.as_secs()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_name_the_provider() {
        let err = ModelError::timeout("gemini", Duration::from_secs(12));
        assert_eq!(
            err.user_message(),
            "Error: 'gemini' did not answer within 12 seconds."
        );
        let err = ModelError::invalid_response("gemini", "missing text");
        assert!(err.user_message().contains("missing text"));
        assert!(ModelError::missing_api_key("gemini").user_message().starts_with("Error:"));
    }
}
