//! Builtin dispatcher
//!
//! Intents flagged builtin-only never become shell commands; they need to
//! observe or mutate per-request state the executor cannot touch. The
//! working directory is supplied by the caller on every call and echoed
//! back, never stored process-wide.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Result of a builtin dispatch: output or error text, plus the possibly
/// updated working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinOutcome {
    pub ok: bool,
    pub output: String,
    pub cwd: PathBuf,
}

impl BuiltinOutcome {
    fn ok(output: String, cwd: PathBuf) -> Self {
        Self {
            ok: true,
            output,
            cwd,
        }
    }

    fn error(output: String, cwd: &Path) -> Self {
        Self {
            ok: false,
            output,
            cwd: cwd.to_path_buf(),
        }
    }
}

/// Route a builtin-only intent to its handler.
pub async fn dispatch(intent_id: &str, raw_param: &str, cwd: &Path) -> BuiltinOutcome {
    match intent_id {
        "change_directory" => change_directory(raw_param, cwd).await,
        other => BuiltinOutcome::error(
            format!("no builtin handler for intent `{}`", other),
            cwd,
        ),
    }
}

/// Resolve and validate a directory change against the supplied working
/// directory. `~` expands to the home directory; an empty target goes
/// home, matching interactive `cd` behavior.
async fn change_directory(target: &str, cwd: &Path) -> BuiltinOutcome {
    let target = target.trim();

    let requested: PathBuf = if target.is_empty() || target == "~" {
        match dirs::home_dir() {
            Some(home) => home,
            None => return BuiltinOutcome::error("cannot determine home directory".to_string(), cwd),
        }
    } else {
        PathBuf::from(shellexpand::tilde(target).into_owned())
    };

    let resolved = if requested.is_absolute() {
        requested
    } else {
        cwd.join(requested)
    };

    let resolved = match resolved.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            return BuiltinOutcome::error(format!("cannot resolve `{}`: {}", target, e), cwd)
        }
    };

    match fs::metadata(&resolved).await {
        Ok(metadata) if metadata.is_dir() => BuiltinOutcome::ok(
            format!("Changed directory to {}", resolved.display()),
            resolved,
        ),
        Ok(_) => BuiltinOutcome::error(format!("`{}` is not a directory", target), cwd),
        Err(e) => BuiltinOutcome::error(format!("cannot access `{}`: {}", target, e), cwd),
    }
}
