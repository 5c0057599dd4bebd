//! Command and path auto-completion
//!
//! Two cases, matching interactive expectations: completing the first
//! word suggests allow-listed program names, completing anything later
//! globs the partial path against the working directory. Directories get
//! a trailing `/` and backslashes are normalized for display.

use std::path::Path;

use crate::security::ALLOWED_COMMANDS;

pub const MAX_SUGGESTIONS: usize = 25;

/// Suggest completions for a partial input line.
pub fn suggest(text: &str, cwd: &Path) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    if !text.contains(' ') {
        return command_suggestions(text);
    }

    let partial = text.split_whitespace().last().unwrap_or_default();
    path_suggestions(partial, cwd)
}

fn command_suggestions(prefix: &str) -> Vec<String> {
    let prefix = prefix.to_lowercase();
    let mut names: Vec<String> = ALLOWED_COMMANDS
        .iter()
        .filter(|c| c.starts_with(&prefix))
        .map(|c| c.to_string())
        .collect();
    names.sort();
    names.truncate(MAX_SUGGESTIONS);
    names
}

fn path_suggestions(partial: &str, cwd: &Path) -> Vec<String> {
    let full = cwd.join(partial);
    let pattern = format!("{}*", full.display());

    let mut suggestions = Vec::new();
    let Ok(paths) = glob::glob(&pattern) else {
        return suggestions;
    };

    for path in paths.flatten() {
        let display = path.strip_prefix(cwd).unwrap_or(&path);
        let mut name = display.display().to_string().replace('\\', "/");
        if path.is_dir() {
            name.push('/');
        }
        suggestions.push(name);
        if suggestions.len() >= MAX_SUGGESTIONS {
            break;
        }
    }

    suggestions.sort();
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let suggestions = suggest("ca", dir.path());
        assert!(suggestions.contains(&"cat".to_string()));
        assert!(!suggestions.contains(&"ls".to_string()));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(suggest("  ", dir.path()).is_empty());
    }

    #[test]
    fn test_path_completion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.txt"), "x").unwrap();
        std::fs::write(dir.path().join("alphabet.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("alps")).unwrap();

        let suggestions = suggest("cat al", dir.path());
        assert!(suggestions.contains(&"alpha.txt".to_string()));
        assert!(suggestions.contains(&"alphabet.txt".to_string()));
        assert!(suggestions.contains(&"alps/".to_string()));
    }

    #[test]
    fn test_no_match_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(suggest("cat zzz", dir.path()).is_empty());
    }
}
