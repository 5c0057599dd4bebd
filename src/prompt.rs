//! Contextual prompt construction and oracle response cleanup
//!
//! When no intent pattern matches, the request is handed to the
//! generative oracle. The prompt states the operational constraints,
//! grounds the model in recent session history, and names the shell
//! dialect. The cleanup half enforces the contract the model is expected
//! but not guaranteed to honor.

use crate::command_builder::Platform;
use crate::error::LingoError;
use crate::security::ALLOWED_COMMANDS;
use crate::session::SessionContext;

/// Literal the oracle is instructed to return for ambiguous or
/// destructive requests.
pub const REFUSAL_SENTINEL: &str = "Error: Ambiguous or unsafe request.";

/// Prefix that marks any oracle reply as a refusal.
const REFUSAL_PREFIX: &str = "Error:";

/// Most-recent history entries embedded in the prompt.
pub const PROMPT_HISTORY_ENTRIES: usize = 3;

/// Per-entry output snippet length, in characters.
pub const PROMPT_OUTPUT_SNIPPET: usize = 200;

/// Build the oracle prompt. Pure function of its inputs.
pub fn build_prompt(request: &str, platform: Platform, context: &SessionContext) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are an expert system administrator inside a command terminal.\n");
    prompt.push_str(
        "Convert the user's natural language request into a single executable shell command.\n",
    );
    prompt.push_str(&format!("The command will run on {}.\n", platform.dialect()));
    prompt.push_str("Rules:\n");
    prompt.push_str("- Return only the command, with no explanation, preamble, or markdown.\n");
    prompt.push_str(&format!(
        "- Only use these programs: {}.\n",
        ALLOWED_COMMANDS.join(", ")
    ));
    prompt.push_str(&format!(
        "- If the request is ambiguous or destructive, return exactly: {}\n",
        REFUSAL_SENTINEL
    ));

    let recent = recent_history(context);
    if !recent.is_empty() {
        prompt.push_str("\nRecent session activity:\n");
        prompt.push_str(&recent);
    }

    if !context.current_files.is_empty() {
        prompt.push_str(&format!(
            "\nFiles in the current directory: {}\n",
            context.current_files.join(", ")
        ));
    }

    prompt.push_str(&format!("\nUser request: \"{}\"\n\nCommand:", request.trim()));
    prompt
}

fn recent_history(context: &SessionContext) -> String {
    let start = context
        .history
        .len()
        .saturating_sub(PROMPT_HISTORY_ENTRIES);
    let mut section = String::new();
    for entry in &context.history[start..] {
        section.push_str(&format!(
            "$ {}\n{}\n",
            entry.command,
            snippet(&entry.output, PROMPT_OUTPUT_SNIPPET)
        ));
    }
    section
}

fn snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.trim_end().to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Normalize a raw oracle reply into a bare command line.
///
/// Strips fenced code blocks (taking the first non-empty line inside the
/// first fence, skipping the language tag), strips backticks, and trims.
/// A reply starting with the refusal prefix surfaces as `Refused`.
pub fn clean_response(raw: &str) -> Result<String, LingoError> {
    let text = raw.trim();

    let candidate = if let Some(fence_start) = text.find("```") {
        let after = &text[fence_start + 3..];
        // the language tag occupies the rest of the opener line
        let body = match after.find('\n') {
            Some(newline) => &after[newline + 1..],
            None => after,
        };
        let body = match body.find("```") {
            Some(fence_end) => &body[..fence_end],
            None => body,
        };
        first_non_empty_line(body)
    } else {
        first_non_empty_line(text)
    };

    let command = candidate.replace('`', "").trim().to_string();

    if command.is_empty() {
        return Err(LingoError::Oracle(
            "model returned an empty response".to_string(),
        ));
    }
    if command.starts_with(REFUSAL_PREFIX) {
        return Err(LingoError::Refused(command));
    }

    Ok(command)
}

fn first_non_empty_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{OperationType, SessionContext, SessionStore, MAX_HISTORY};

    fn context_with_history() -> SessionContext {
        let store = SessionStore::new(MAX_HISTORY, Platform::Posix);
        store.update(
            "s",
            "ls -la",
            "-rw-r--r-- 1 u u 12 Aug 7 10:00 a.txt",
            OperationType::Listing,
        );
        store.update("s", "cat a.txt", "hello world", OperationType::FileRead);
        store.get_or_create("s")
    }

    #[test]
    fn test_prompt_names_platform_and_sentinel() {
        let prompt = build_prompt("show me the biggest file", Platform::Posix, &SessionContext::default());
        assert!(prompt.contains("POSIX"));
        assert!(prompt.contains(REFUSAL_SENTINEL));
        assert!(prompt.contains("show me the biggest file"));
    }

    #[test]
    fn test_prompt_embeds_history_and_files() {
        let context = context_with_history();
        let prompt = build_prompt("read it again", Platform::Posix, &context);
        assert!(prompt.contains("$ ls -la"));
        assert!(prompt.contains("$ cat a.txt"));
        assert!(prompt.contains("a.txt"));
    }

    #[test]
    fn test_prompt_truncates_long_output() {
        let store = SessionStore::new(MAX_HISTORY, Platform::Posix);
        store.update("s", "cat big.txt", &"x".repeat(1000), OperationType::FileRead);
        let prompt = build_prompt("next", Platform::Posix, &store.get_or_create("s"));
        assert!(prompt.contains("..."));
        assert!(!prompt.contains(&"x".repeat(500)));
    }

    #[test]
    fn test_prompt_embeds_at_most_three_entries() {
        let store = SessionStore::new(MAX_HISTORY, Platform::Posix);
        for i in 0..5 {
            store.update("s", &format!("echo {}", i), "ok", OperationType::Other);
        }
        let prompt = build_prompt("next", Platform::Posix, &store.get_or_create("s"));
        assert!(!prompt.contains("$ echo 0"));
        assert!(!prompt.contains("$ echo 1"));
        assert!(prompt.contains("$ echo 2"));
        assert!(prompt.contains("$ echo 4"));
    }

    #[test]
    fn test_clean_plain_command() {
        assert_eq!(clean_response("ls -la\n").unwrap(), "ls -la");
    }

    #[test]
    fn test_clean_strips_fences_with_language_tag() {
        let raw = "```bash\nls -la\n```";
        assert_eq!(clean_response(raw).unwrap(), "ls -la");
    }

    #[test]
    fn test_clean_strips_bare_fences() {
        let raw = "```\nfind . -name \"*.py\"\n```";
        assert_eq!(clean_response(raw).unwrap(), "find . -name \"*.py\"");
    }

    #[test]
    fn test_clean_takes_first_line_of_chatty_reply() {
        let raw = "ls -la\n\nThis lists all files including hidden ones.";
        assert_eq!(clean_response(raw).unwrap(), "ls -la");
    }

    #[test]
    fn test_clean_strips_inline_backticks() {
        assert_eq!(clean_response("`pwd`").unwrap(), "pwd");
    }

    #[test]
    fn test_refusal_surfaces_as_error() {
        let err = clean_response(REFUSAL_SENTINEL).unwrap_err();
        assert!(matches!(err, LingoError::Refused(_)));
    }

    #[test]
    fn test_refusal_inside_fence_still_detected() {
        let raw = format!("```\n{}\n```", REFUSAL_SENTINEL);
        let err = clean_response(&raw).unwrap_err();
        assert!(matches!(err, LingoError::Refused(_)));
    }

    #[test]
    fn test_empty_reply_is_oracle_error() {
        let err = clean_response("``` ```").unwrap_err();
        assert!(matches!(err, LingoError::Oracle(_)));
    }
}
