//! End-to-end request pipeline
//!
//! raw input -> intent matcher -> (command builder | oracle prompt ->
//! completion -> cleanup) -> security validator -> executor -> session
//! update -> result. The validator is the one mandatory gate: no code
//! path reaches the executor without passing it.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;

use crate::builtins;
use crate::command_builder::{build_command, Platform};
use crate::config::EngineConfig;
use crate::error::LingoError;
use crate::executor;
use crate::intents::{IntentLibrary, IntentLoadError};
use crate::oracle::{OllamaOracle, Oracle};
use crate::prompt::{build_prompt, clean_response};
use crate::security;
use crate::session::{OperationType, SessionStore};
use crate::structured_log::{log_event, LogLevel};

/// Requests longer than this are rejected before the pipeline runs.
pub const MAX_REQUEST_LEN: usize = 2000;

/// One natural-language request against a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub input: String,
    pub session_id: String,
    pub working_dir: PathBuf,
}

/// Successful outcome: caller-facing output plus the (possibly updated)
/// working directory to carry into the next request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub output: String,
    pub working_dir: PathBuf,
    /// Set when the oracle produced the command, for "translated to"
    /// feedback in clients.
    pub translated_command: Option<String>,
}

/// The assembled pipeline. One engine serves many concurrent requests;
/// the session store is the only shared mutable state.
pub struct Engine {
    config: EngineConfig,
    library: IntentLibrary,
    sessions: SessionStore,
    oracle: Option<Box<dyn Oracle>>,
    platform: Platform,
}

impl Engine {
    /// Build an engine from config, wiring the Ollama oracle when AI is
    /// enabled.
    pub fn new(config: EngineConfig) -> Result<Self, IntentLoadError> {
        let oracle: Option<Box<dyn Oracle>> = if config.ai_enabled {
            Some(Box::new(OllamaOracle::new(
                config.ollama_url.clone(),
                config.model.clone(),
            )))
        } else {
            None
        };
        Self::with_oracle(config, oracle)
    }

    /// Build an engine with an explicit oracle (or none). Test seam.
    pub fn with_oracle(
        config: EngineConfig,
        oracle: Option<Box<dyn Oracle>>,
    ) -> Result<Self, IntentLoadError> {
        let platform = Platform::current();
        Ok(Self {
            library: IntentLibrary::load()?,
            sessions: SessionStore::new(config.max_history, platform),
            oracle,
            platform,
            config,
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one request end to end.
    pub async fn handle(&self, request: CommandRequest) -> Result<CommandResponse, LingoError> {
        let input = request.input.trim();
        if input.is_empty() {
            return Err(LingoError::Malformed("empty input".to_string()));
        }
        if input.len() > MAX_REQUEST_LEN {
            return Err(LingoError::Malformed(format!(
                "input exceeds {} characters",
                MAX_REQUEST_LEN
            )));
        }

        log_event(
            LogLevel::Info,
            "PIPELINE",
            "request",
            json!({"session": request.session_id, "input": input}),
        );

        let mut translated_command = None;

        let command = match self.library.find(input) {
            Some((intent, parsed)) => {
                log_event(
                    LogLevel::Info,
                    "MATCHER",
                    "intent_match",
                    json!({"intent": parsed.intent_id, "pattern": parsed.pattern}),
                );

                if intent.def.builtin {
                    let raw_param = parsed.params.first().map(String::as_str).unwrap_or("");
                    return self.handle_builtin(&request, &parsed.intent_id, raw_param).await;
                }

                build_command(intent, &parsed.params, self.platform)
                    .map_err(|e| LingoError::Malformed(e.to_string()))?
            }
            None => {
                log_event(
                    LogLevel::Info,
                    "MATCHER",
                    "no_intent",
                    json!({"session": request.session_id}),
                );
                let command = self.translate(input, &request.session_id).await?;
                translated_command = Some(command.clone());
                command
            }
        };

        let verdict = security::validate(&command);
        if !verdict.safe {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "unspecified violation".to_string());
            log_event(
                LogLevel::Warn,
                "SECURITY",
                "rejected",
                json!({"command": command, "reason": reason}),
            );
            return Err(LingoError::SecurityRejected(reason));
        }

        let result = executor::execute(
            &command,
            &request.working_dir,
            self.config.exec_timeout_secs,
        )
        .await;
        let output = result.text();

        log_event(
            LogLevel::Info,
            "EXECUTOR",
            "finished",
            json!({
                "command": command,
                "exit_code": result.exit_code,
                "timed_out": result.timed_out,
            }),
        );

        let operation = OperationType::infer(&command);
        self.sessions
            .update(&request.session_id, &command, &output, operation);

        Ok(CommandResponse {
            output,
            working_dir: request.working_dir,
            translated_command,
        })
    }

    /// Route a builtin-only intent and keep session state in step.
    async fn handle_builtin(
        &self,
        request: &CommandRequest,
        intent_id: &str,
        raw_param: &str,
    ) -> Result<CommandResponse, LingoError> {
        let outcome = builtins::dispatch(intent_id, raw_param, &request.working_dir).await;

        log_event(
            LogLevel::Info,
            "PIPELINE",
            "builtin",
            json!({"intent": intent_id, "ok": outcome.ok}),
        );

        let history_command = format!("cd {}", raw_param);
        self.sessions.update(
            &request.session_id,
            &history_command,
            &outcome.output,
            OperationType::Navigation,
        );

        Ok(CommandResponse {
            output: outcome.output,
            working_dir: outcome.cwd,
            translated_command: None,
        })
    }

    /// Oracle path: contextual prompt, completion, response cleanup.
    async fn translate(&self, input: &str, session_id: &str) -> Result<String, LingoError> {
        let oracle = self.oracle.as_ref().ok_or(LingoError::OracleDisabled)?;

        let context = self.sessions.get_or_create(session_id);
        let prompt = build_prompt(input, self.platform, &context);

        let raw = oracle
            .complete(&prompt)
            .await
            .map_err(|e| LingoError::Oracle(e.to_string()))?;

        let command = clean_response(&raw)?;
        log_event(
            LogLevel::Info,
            "ORACLE",
            "translated",
            json!({"input": input, "command": command}),
        );
        Ok(command)
    }
}
