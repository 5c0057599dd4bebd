//! Bounded command execution with cross-platform dispatch
//!
//! On Windows the command runs through `cmd /C` so shell syntax in
//! generated commands resolves; on the POSIX family it is tokenized into
//! an argv vector and run without any shell interpretation. Every failure
//! mode (non-zero exit, timeout, missing executable, spawn error) is a
//! normal result value, never an error raised to the caller.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::command_builder::Platform;

/// Hard ceiling on command execution time.
pub const EXEC_TIMEOUT_SECS: u64 = 30;

/// Probed when the executable is not on `PATH`.
const POSIX_FALLBACK_DIRS: &[&str] = &["/bin", "/usr/bin", "/usr/local/bin", "/sbin", "/usr/sbin"];

pub const SUCCESS_MARKER: &str = "Command executed successfully.";

/// Outcome of one execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    /// Set when the executable could not be resolved; holds its name.
    pub not_found: Option<String>,
    /// The limit this run was bounded by, echoed into the timeout marker.
    pub limit_secs: u64,
}

impl ExecutionResult {
    fn completed(output: std::process::Output, limit_secs: u64) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            timed_out: false,
            not_found: None,
            limit_secs,
        }
    }

    fn not_found(name: &str, limit_secs: u64) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
            not_found: Some(name.to_string()),
            limit_secs,
        }
    }

    fn spawn_failure(error: std::io::Error, limit_secs: u64) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: error.to_string(),
            timed_out: false,
            not_found: None,
            limit_secs,
        }
    }

    fn timeout(limit_secs: u64) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
            not_found: None,
            limit_secs,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out && self.not_found.is_none()
    }

    /// Caller-facing text: stdout on success (or the success marker),
    /// stderr on failure (or a marker naming the exit status), and the
    /// literal timeout / not-found markers.
    pub fn text(&self) -> String {
        if let Some(name) = &self.not_found {
            return format!("Command not found: {}", name);
        }
        if self.timed_out {
            return format!("Command timed out after {} seconds.", self.limit_secs);
        }
        if self.exit_code == Some(0) {
            let out = self.stdout.trim_end();
            if out.is_empty() {
                SUCCESS_MARKER.to_string()
            } else {
                out.to_string()
            }
        } else {
            let err = self.stderr.trim_end();
            if err.is_empty() {
                let status = self
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                format!("Command failed with exit status {}.", status)
            } else {
                err.to_string()
            }
        }
    }
}

/// Run a validated command under `working_dir`, bounded by `limit_secs`.
pub async fn execute(command: &str, working_dir: &Path, limit_secs: u64) -> ExecutionResult {
    let mut cmd = match Platform::current() {
        Platform::Windows => {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        }
        Platform::Posix => {
            let tokens = tokenize(command);
            let Some((program, args)) = tokens.split_first() else {
                return ExecutionResult::spawn_failure(
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
                    limit_secs,
                );
            };
            let resolved = match resolve_executable(program) {
                Some(path) => path,
                None => return ExecutionResult::not_found(program, limit_secs),
            };
            let mut cmd = Command::new(resolved);
            cmd.args(args);
            cmd
        }
    };

    cmd.current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group so a timeout kill reaches descendants too.
    #[cfg(unix)]
    unsafe {
        cmd.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let name = command.split_whitespace().next().unwrap_or(command);
            return ExecutionResult::not_found(name, limit_secs);
        }
        Err(e) => return ExecutionResult::spawn_failure(e, limit_secs),
    };

    #[cfg(unix)]
    let pid = child.id();

    match timeout(Duration::from_secs(limit_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => ExecutionResult::completed(output, limit_secs),
        Ok(Err(e)) => ExecutionResult::spawn_failure(e, limit_secs),
        Err(_elapsed) => {
            // kill_on_drop reaped the child; sweep its process group
            #[cfg(unix)]
            if let Some(pid) = pid {
                unsafe {
                    libc::killpg(pid as i32, libc::SIGKILL);
                }
            }
            ExecutionResult::timeout(limit_secs)
        }
    }
}

/// Quote-aware argv splitter. No expansion, no substitution: single and
/// double quotes group words, backslash escapes the next character.
pub fn tokenize(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '\\' if !in_single => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() && !in_single && !in_double => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Resolve an executable name against `PATH`, then the standard
/// installation directories.
fn resolve_executable(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if name.contains('/') {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    if let Some(paths) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths) {
            let probe = dir.join(name);
            if is_executable(&probe) {
                return Some(probe);
            }
        }
    }

    for dir in POSIX_FALLBACK_DIRS {
        let probe = Path::new(dir).join(name);
        if is_executable(&probe) {
            return Some(probe);
        }
    }

    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
