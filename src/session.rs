//! Session context store
//!
//! Process-wide map from session id to bounded conversation memory:
//! recent commands with their outputs, the last operation kind, and the
//! file names observed in the most recent directory listing. The store is
//! the sole writer; all mutation goes through `update`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::command_builder::Platform;

/// History entries kept per session before the oldest is evicted.
pub const MAX_HISTORY: usize = 5;

/// File names remembered from the most recent listing.
pub const MAX_TRACKED_FILES: usize = 20;

/// Coarse classification of an executed command, inferred from its
/// first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Listing,
    Navigation,
    FileCreate,
    FileDelete,
    FileRead,
    FileTransfer,
    Search,
    SystemQuery,
    Other,
}

impl OperationType {
    /// Infer the operation kind from a rendered command.
    pub fn infer(command: &str) -> Self {
        let first = command
            .trim()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match first.as_str() {
            "ls" | "dir" => OperationType::Listing,
            "cd" => OperationType::Navigation,
            "touch" | "mkdir" => OperationType::FileCreate,
            "rm" | "del" | "rd" => OperationType::FileDelete,
            "cat" | "type" | "head" | "tail" | "wc" => OperationType::FileRead,
            "cp" | "copy" | "mv" | "move" => OperationType::FileTransfer,
            "find" | "findstr" | "grep" => OperationType::Search,
            "df" | "du" | "free" | "ps" | "tasklist" | "wmic" | "uname" | "ver" | "whoami"
            | "hostname" | "date" => OperationType::SystemQuery,
            _ => OperationType::Other,
        }
    }

    pub fn is_listing(&self) -> bool {
        matches!(self, OperationType::Listing)
    }
}

/// One executed command and its captured output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub output: String,
    pub operation: OperationType,
    pub timestamp: DateTime<Utc>,
}

/// Bounded per-session memory. Command history and output history live in
/// one entry list, so their lengths cannot diverge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub history: Vec<HistoryEntry>,
    pub last_operation: Option<OperationType>,
    pub current_files: Vec<String>,
}

/// Keyed store owning every `SessionContext`. Contexts are created lazily
/// on first use and live for the process lifetime.
pub struct SessionStore {
    max_history: usize,
    platform: Platform,
    sessions: Mutex<HashMap<String, SessionContext>>,
}

impl SessionStore {
    pub fn new(max_history: usize, platform: Platform) -> Self {
        Self {
            max_history,
            platform,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionContext>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Snapshot of a session's context, creating it empty if absent.
    pub fn get_or_create(&self, session_id: &str) -> SessionContext {
        let mut sessions = self.lock();
        sessions
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Append one history entry, evict past the maximum, and recompute the
    /// tracked file list when the operation was a directory listing.
    pub fn update(&self, session_id: &str, command: &str, output: &str, operation: OperationType) {
        let mut sessions = self.lock();
        let context = sessions.entry(session_id.to_string()).or_default();

        context.history.push(HistoryEntry {
            command: command.to_string(),
            output: output.to_string(),
            operation,
            timestamp: Utc::now(),
        });
        while context.history.len() > self.max_history {
            context.history.remove(0);
        }

        context.last_operation = Some(operation);
        if operation.is_listing() {
            context.current_files = parse_listing(output, self.platform);
        }
    }

    pub fn session_count(&self) -> usize {
        self.lock().len()
    }
}

/// Extract file names from directory-listing output. Decorative lines
/// are skipped and the final whitespace-delimited field of each
/// remaining line is taken as the name. Names containing spaces are out
/// of scope for this heuristic.
pub fn parse_listing(output: &str, platform: Platform) -> Vec<String> {
    let mut files = Vec::new();

    for line in output.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        match platform {
            Platform::Posix => {
                // `ls -l` prefixes the listing with a "total N" line
                if line.starts_with("total ") {
                    continue;
                }
            }
            Platform::Windows => {
                // `dir` banner and summary lines
                let trimmed = line.trim_start();
                if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
                    continue;
                }
                if trimmed.contains("File(s)") || trimmed.contains("Dir(s)") {
                    continue;
                }
            }
        }

        if let Some(name) = line.split_whitespace().last() {
            if name == "." || name == ".." {
                continue;
            }
            files.push(name.to_string());
        }

        if files.len() >= MAX_TRACKED_FILES {
            break;
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(MAX_HISTORY, Platform::Posix)
    }

    #[test]
    fn test_get_or_create_is_lazy_and_idempotent() {
        let store = store();
        assert_eq!(store.session_count(), 0);

        let first = store.get_or_create("s1");
        assert!(first.history.is_empty());
        assert_eq!(store.session_count(), 1);

        let second = store.get_or_create("s1");
        assert!(second.history.is_empty());
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_eviction_keeps_most_recent_in_order() {
        let store = store();
        for i in 0..8 {
            store.update(
                "s1",
                &format!("echo {}", i),
                &format!("out {}", i),
                OperationType::Other,
            );
        }

        let context = store.get_or_create("s1");
        assert_eq!(context.history.len(), MAX_HISTORY);
        let commands: Vec<&str> = context
            .history
            .iter()
            .map(|e| e.command.as_str())
            .collect();
        assert_eq!(
            commands,
            vec!["echo 3", "echo 4", "echo 5", "echo 6", "echo 7"]
        );
    }

    #[test]
    fn test_commands_and_outputs_stay_parallel() {
        let store = store();
        for i in 0..8 {
            store.update("s1", &format!("c{}", i), &format!("o{}", i), OperationType::Other);
        }
        let context = store.get_or_create("s1");
        for entry in &context.history {
            assert_eq!(
                entry.command.trim_start_matches('c'),
                entry.output.trim_start_matches('o')
            );
        }
    }

    #[test]
    fn test_listing_updates_current_files() {
        let store = store();
        let listing = "total 8\n\
                       drwxr-xr-x 2 u u 4096 Aug  7 10:00 .\n\
                       drwxr-xr-x 9 u u 4096 Aug  7 10:00 ..\n\
                       -rw-r--r-- 1 u u   12 Aug  7 10:00 a.txt\n\
                       -rw-r--r-- 1 u u   34 Aug  7 10:00 b.py";
        store.update("s1", "ls -la", listing, OperationType::Listing);

        let context = store.get_or_create("s1");
        assert_eq!(context.current_files, vec!["a.txt", "b.py"]);
        assert_eq!(context.last_operation, Some(OperationType::Listing));
    }

    #[test]
    fn test_non_listing_preserves_current_files() {
        let store = store();
        store.update("s1", "ls -la", "-rw-r--r-- 1 u u 1 Aug 7 10:00 a.txt", OperationType::Listing);
        store.update("s1", "cat a.txt", "hello", OperationType::FileRead);

        let context = store.get_or_create("s1");
        assert_eq!(context.current_files, vec!["a.txt"]);
        assert_eq!(context.last_operation, Some(OperationType::FileRead));
    }

    #[test]
    fn test_windows_listing_parse() {
        let listing = " Volume in drive C has no label.\n\
                       \n Directory of C:\\work\n\
                       \n01/02/2026  10:00 AM    <DIR>          .\n\
                       01/02/2026  10:00 AM    <DIR>          ..\n\
                       01/02/2026  10:00 AM            12 a.txt\n\
                       01/02/2026  10:00 AM            34 b.py\n\
                       \n               2 File(s)             46 bytes";
        let files = parse_listing(listing, Platform::Windows);
        assert_eq!(files, vec!["a.txt", "b.py"]);
    }

    #[test]
    fn test_tracked_files_capped() {
        let listing: String = (0..40)
            .map(|i| format!("-rw-r--r-- 1 u u 1 Aug 7 10:00 f{}.txt\n", i))
            .collect();
        let files = parse_listing(&listing, Platform::Posix);
        assert_eq!(files.len(), MAX_TRACKED_FILES);
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = store();
        store.update("a", "ls -la", "x", OperationType::Listing);
        let other = store.get_or_create("b");
        assert!(other.history.is_empty());
    }

    #[test]
    fn test_operation_inference() {
        assert_eq!(OperationType::infer("ls -la"), OperationType::Listing);
        assert_eq!(OperationType::infer("touch a.txt"), OperationType::FileCreate);
        assert_eq!(OperationType::infer("rm a.txt"), OperationType::FileDelete);
        assert_eq!(OperationType::infer("grep foo b.py"), OperationType::Search);
        assert_eq!(OperationType::infer("banana"), OperationType::Other);
    }
}
