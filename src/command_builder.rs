//! Command builder: renders a matched intent into a platform command
//!
//! Substitutes captured parameters (or the intent's documented defaults)
//! into the platform-appropriate template. Output carries no injection
//! guarantee beyond the quoting baked into templates; the pipeline always
//! re-validates before execution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intents::CompiledIntent;

/// Platform family of the running host, resolved once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Shell dialect name, used when prompting the model.
    pub fn dialect(&self) -> &'static str {
        match self {
            Platform::Posix => "a POSIX system (bash-compatible shell)",
            Platform::Windows => "Windows (cmd.exe)",
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("intent `{0}` is handled by a builtin, not a shell command")]
    BuiltinOnly(String),
}

/// Render the command for a matched intent.
///
/// Parameters map positionally onto the intent's declared placeholders;
/// a missing or empty capture falls back to the placeholder's default.
pub fn build_command(
    intent: &CompiledIntent,
    params: &[String],
    platform: Platform,
) -> Result<String, BuildError> {
    if intent.def.builtin {
        return Err(BuildError::BuiltinOnly(intent.def.id.to_string()));
    }

    let template = match platform {
        Platform::Posix => intent.def.posix_template,
        Platform::Windows => intent.def.windows_template,
    };

    let mut rendered = template.to_string();
    for (position, placeholder) in intent.def.placeholders.iter().enumerate() {
        let raw = params
            .get(position)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .unwrap_or(placeholder.default);
        let value = coerce_parameter(intent.def.id, placeholder.name, raw);
        rendered = rendered.replace(&format!("{{{{{}}}}}", placeholder.name), &value);
    }

    Ok(rendered)
}

/// Intent-specific parameter coercion.
fn coerce_parameter(intent_id: &str, placeholder: &str, raw: &str) -> String {
    if intent_id == "find_files" && placeholder == "pattern" {
        glob_for_term(raw)
    } else {
        raw.to_string()
    }
}

/// Map a loose file-kind term onto a canonical glob. Terms that already
/// look like globs or filenames pass through untouched.
pub fn glob_for_term(term: &str) -> String {
    let normalized = term.trim().to_lowercase();
    match normalized.as_str() {
        "python" => "*.py".to_string(),
        "rust" => "*.rs".to_string(),
        "javascript" => "*.js".to_string(),
        "text" => "*.txt".to_string(),
        "image" => "*.png".to_string(),
        "document" => "*.pdf".to_string(),
        "video" => "*.mp4".to_string(),
        "audio" => "*.mp3".to_string(),
        "log" => "*.log".to_string(),
        _ if normalized.contains('*') || normalized.contains('.') => term.trim().to_string(),
        _ => format!("*{}*", normalized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intents::IntentLibrary;

    fn library() -> IntentLibrary {
        IntentLibrary::load().unwrap()
    }

    #[test]
    fn test_create_file_round_trip() {
        let lib = library();
        let (intent, parsed) = lib.find("create a file called notes.txt").unwrap();

        let posix = build_command(intent, &parsed.params, Platform::Posix).unwrap();
        assert_eq!(posix, "touch notes.txt");

        let windows = build_command(intent, &parsed.params, Platform::Windows).unwrap();
        assert!(windows.contains("notes.txt"));
    }

    #[test]
    fn test_missing_filename_uses_default() {
        let lib = library();
        let (intent, parsed) = lib.find("make a new file").unwrap();
        let command = build_command(intent, &parsed.params, Platform::Posix).unwrap();
        assert_eq!(command, "touch newfile.txt");
    }

    #[test]
    fn test_list_files_per_platform() {
        let lib = library();
        let (intent, parsed) = lib.find("show all files").unwrap();
        assert_eq!(
            build_command(intent, &parsed.params, Platform::Posix).unwrap(),
            "ls -la"
        );
        assert_eq!(
            build_command(intent, &parsed.params, Platform::Windows).unwrap(),
            "dir"
        );
    }

    #[test]
    fn test_find_files_coerces_loose_terms() {
        let lib = library();
        let (intent, parsed) = lib.find("find all python files").unwrap();
        let command = build_command(intent, &parsed.params, Platform::Posix).unwrap();
        assert_eq!(command, "find . -name \"*.py\"");
    }

    #[test]
    fn test_find_files_unknown_term_becomes_generic_glob() {
        assert_eq!(glob_for_term("invoice"), "*invoice*");
        assert_eq!(glob_for_term("report.txt"), "report.txt");
        assert_eq!(glob_for_term("*.csv"), "*.csv");
    }

    #[test]
    fn test_builtin_intent_never_templates() {
        let lib = library();
        let (intent, parsed) = lib.find("go to the downloads folder").unwrap();
        let err = build_command(intent, &parsed.params, Platform::Posix).unwrap_err();
        assert!(matches!(err, BuildError::BuiltinOnly(_)));
    }

    #[test]
    fn test_copy_fills_both_placeholders() {
        let lib = library();
        let (intent, parsed) = lib.find("copy a.txt to backup/").unwrap();
        let command = build_command(intent, &parsed.params, Platform::Posix).unwrap();
        assert_eq!(command, "cp a.txt backup/");
    }
}
