//! Command safety validation
//!
//! The single mandatory gate between any command origin (pattern-built or
//! model-generated) and the executor. Rules apply in order and the first
//! failure wins: empty command, oversized command, deny-listed fragment,
//! first token not on the allow-list.

use serde::{Deserialize, Serialize};

/// Commands longer than this are rejected outright.
pub const MAX_COMMAND_LEN: usize = 1000;

/// Known-destructive fragments, matched case-insensitively as substrings
/// anywhere in the command text.
pub const DENY_FRAGMENTS: &[&str] = &[
    // recursive root/home deletion
    "rm -rf /",
    "rm -fr /",
    "rm -rf ~",
    "rm -rf *",
    "rd /s /q c:\\",
    "del /f /s /q c:\\",
    // disk formatting and partitioning
    "mkfs",
    "fdisk",
    "diskpart",
    "format c:",
    "dd if=",
    "> /dev/sd",
    // power and halt controls
    "shutdown",
    "reboot",
    "poweroff",
    "halt",
    "init 0",
    "init 6",
    // privilege escalation
    "sudo",
    "su -",
    "runas",
    // fork bombs
    ":(){",
    "%0|%0",
    // mass permission/ownership changes
    "chmod -r 777 /",
    "chmod 777 /",
    "chown -r",
];

/// Program names permitted as the first token of a command.
pub const ALLOWED_COMMANDS: &[&str] = &[
    "ls", "dir", "pwd", "cd", "cat", "type", "echo", "touch", "mkdir", "rm", "del", "cp",
    "copy", "mv", "move", "find", "findstr", "grep", "head", "tail", "wc", "sort", "uniq",
    "df", "du", "free", "ps", "tasklist", "wmic", "uname", "ver", "whoami", "hostname",
    "date", "which", "where", "stat", "file", "tree", "env", "printenv",
];

/// Outcome of validating one command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub safe: bool,
    pub reason: Option<String>,
}

impl ValidationResult {
    fn safe() -> Self {
        Self {
            safe: true,
            reason: None,
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            safe: false,
            reason: Some(reason),
        }
    }
}

/// Validate a command before execution.
pub fn validate(command: &str) -> ValidationResult {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return ValidationResult::rejected("empty command".to_string());
    }

    if command.len() > MAX_COMMAND_LEN {
        return ValidationResult::rejected(format!(
            "command exceeds {} characters",
            MAX_COMMAND_LEN
        ));
    }

    let lowered = trimmed.to_lowercase();
    for fragment in DENY_FRAGMENTS {
        if lowered.contains(fragment) {
            return ValidationResult::rejected(format!(
                "contains forbidden fragment `{}`",
                fragment
            ));
        }
    }

    // Exact match on the resolved program name, not a substring check.
    let first_token = match lowered.split_whitespace().next() {
        Some(token) => token,
        None => return ValidationResult::rejected("empty command".to_string()),
    };
    if !ALLOWED_COMMANDS.contains(&first_token) {
        return ValidationResult::rejected(format!(
            "program `{}` is not on the allow-list",
            first_token
        ));
    }

    ValidationResult::safe()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_rejected() {
        let result = validate("   ");
        assert!(!result.safe);
        assert!(result.reason.unwrap().contains("empty"));
    }

    #[test]
    fn test_oversized_command_rejected() {
        let long = format!("echo {}", "a".repeat(MAX_COMMAND_LEN));
        let result = validate(&long);
        assert!(!result.safe);
        assert!(result.reason.unwrap().contains("exceeds"));
    }

    #[test]
    fn test_shutdown_rejected_with_named_fragment() {
        let result = validate("shutdown now");
        assert!(!result.safe);
        assert!(result.reason.unwrap().contains("shutdown"));
    }

    #[test]
    fn test_deny_fragment_wins_over_allowed_first_token() {
        // first token is allow-listed, the embedded fragment still blocks
        let result = validate("echo test && sudo rm -rf /");
        assert!(!result.safe);
    }

    #[test]
    fn test_deny_is_case_insensitive() {
        let result = validate("SHUTDOWN /s /t 0");
        assert!(!result.safe);
    }

    #[test]
    fn test_unknown_program_rejected_with_named_token() {
        let result = validate("python3 -c 'print(1)'");
        assert!(!result.safe);
        assert!(result.reason.unwrap().contains("python3"));
    }

    #[test]
    fn test_fork_bomb_rejected() {
        let result = validate(":(){ :|:& };:");
        assert!(!result.safe);
    }

    #[test]
    fn test_plain_listing_allowed() {
        assert!(validate("ls -la").safe);
        assert!(validate("dir").safe);
        assert!(validate("find . -name \"*.py\"").safe);
    }

    #[test]
    fn test_single_file_rm_allowed() {
        assert!(validate("rm notes.txt").safe);
    }
}
