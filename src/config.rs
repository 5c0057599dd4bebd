//! Runtime configuration for lingo_core
//!
//! Defaults work out of the box against a local Ollama instance; every
//! field can be overridden through `LINGO_*` environment variables.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the Ollama-compatible generation endpoint.
    pub ollama_url: String,
    /// Model used for natural-language-to-command translation.
    pub model: String,
    /// When false, unmatched requests fail with `OracleDisabled` instead
    /// of contacting the model.
    pub ai_enabled: bool,
    /// Hard ceiling on command execution time.
    pub exec_timeout_secs: u64,
    /// Per-session history entries kept before eviction.
    pub max_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model: "deepseek-coder:6.7b".to_string(),
            ai_enabled: true,
            exec_timeout_secs: crate::executor::EXEC_TIMEOUT_SECS,
            max_history: crate::session::MAX_HISTORY,
        }
    }
}

impl EngineConfig {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("LINGO_OLLAMA_URL") {
            config.ollama_url = url;
        }
        if let Ok(model) = std::env::var("LINGO_MODEL") {
            config.model = model;
        }
        if let Ok(enabled) = std::env::var("LINGO_AI_ENABLED") {
            config.ai_enabled = !matches!(enabled.as_str(), "0" | "false" | "no");
        }
        if let Ok(secs) = std::env::var("LINGO_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse() {
                config.exec_timeout_secs = parsed;
            }
        }

        config
    }
}
