//! Generative oracle client
//!
//! The pipeline treats the model as an opaque `complete(prompt) -> text`
//! collaborator. The shipped implementation talks to an Ollama-compatible
//! `/api/generate` endpoint; tests substitute their own `Oracle`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct OracleError(pub String);

/// One-shot text completion.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

/// Ollama-backed oracle.
pub struct OllamaOracle {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaOracle {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Oracle for OllamaOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(OracleError(format!(
                "model endpoint returned HTTP {}",
                response.status()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| OracleError(format!("failed to parse response: {}", e)))?;

        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let body = GenerateRequest {
            model: "deepseek-coder:6.7b",
            prompt: "Command:",
            stream: false,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("deepseek-coder"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let oracle = OllamaOracle::new("http://127.0.0.1:1", "m");
        let err = oracle.complete("hello").await.unwrap_err();
        assert!(err.0.contains("request failed"));
    }
}
