//! Error taxonomy for lingo_core
//!
//! Every per-request failure the pipeline can surface to a caller.
//! "No intent matched" is not an error (it selects the oracle path), and
//! command failures inside the executor are ordinary result values.

use thiserror::Error;

/// Failures the pipeline reports to its caller.
#[derive(Debug, Error)]
pub enum LingoError {
    /// Request rejected before entering the pipeline.
    #[error("invalid request: {0}")]
    Malformed(String),

    /// No generative backend is configured.
    #[error("AI features are not configured. Please set up the model endpoint.")]
    OracleDisabled,

    /// The generative backend failed (transport or protocol error).
    #[error("Error contacting AI model: {0}")]
    Oracle(String),

    /// The request was judged ambiguous or destructive.
    #[error("{0}")]
    Refused(String),

    /// The command failed safety validation and was never executed.
    #[error("Command blocked: {0}")]
    SecurityRejected(String),
}

impl LingoError {
    /// Whether this error should be presented as a policy refusal rather
    /// than a technical failure.
    pub fn is_refusal(&self) -> bool {
        matches!(self, LingoError::Refused(_) | LingoError::SecurityRejected(_))
    }
}
