//! lingo_core - natural language command terminal backend
//!
//! Translates free-text requests into single validated shell commands and
//! runs them against a caller-supplied working directory.
//!
//! Modules:
//! - intents: fixed pattern library and intent matcher
//! - command_builder: platform-aware template rendering
//! - session: bounded per-session command/output memory
//! - prompt: contextual oracle prompts and response cleanup
//! - security: allow-list / deny-fragment command validation
//! - executor: bounded cross-platform command execution
//! - builtins: dispatcher for intents that mutate request state
//! - oracle: generative backend client
//! - completions: command and path auto-completion
//! - pipeline: end-to-end engine
//! - config: runtime configuration
//! - structured_log: JSONL event logging
//! - error: per-request error taxonomy

pub mod builtins;
pub mod command_builder;
pub mod completions;
pub mod config;
pub mod error;
pub mod executor;
pub mod intents;
pub mod oracle;
pub mod pipeline;
pub mod prompt;
pub mod security;
pub mod session;
pub mod structured_log;

// Re-export key types for convenience
pub use builtins::BuiltinOutcome;
pub use command_builder::{build_command, BuildError, Platform};
pub use completions::suggest;
pub use config::EngineConfig;
pub use error::LingoError;
pub use executor::{execute, ExecutionResult, EXEC_TIMEOUT_SECS};
pub use intents::{IntentLibrary, ParsedMatch};
pub use oracle::{OllamaOracle, Oracle, OracleError};
pub use pipeline::{CommandRequest, CommandResponse, Engine};
pub use prompt::{build_prompt, clean_response, REFUSAL_SENTINEL};
pub use security::{validate, ValidationResult, ALLOWED_COMMANDS};
pub use session::{OperationType, SessionContext, SessionStore, MAX_HISTORY};
pub use structured_log::{init_logger, log_event, LogConfig, LogLevel};

/// Generate a unique id with prefix, for session identifiers.
pub fn make_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}
