//! Structured Logging - JSON-formatted pipeline events
//!
//! Every pipeline stage emits one JSONL entry to stderr (and optionally a
//! file) so request handling can be traced and asserted on in tests.
//!
//! Output:
//!   {"timestamp":"2026-08-07T12:34:56Z","level":"info","component":"MATCHER","event":"intent_match","data":{"intent":"list_files"}}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

lazy_static::lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
    static ref LOG_CONFIG: Mutex<LogConfig> = Mutex::new(LogConfig::default());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub component: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Emit to stderr. Disabled in quiet embedding contexts.
    pub stderr_output: bool,
    pub file_path: Option<PathBuf>,
    pub min_level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            stderr_output: true,
            file_path: None,
            min_level: LogLevel::Info,
        }
    }
}

/// Install a logger configuration. Call once at startup.
pub fn init_logger(config: LogConfig) {
    if let Some(path) = &config.file_path {
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(path) {
            if let Ok(mut log_file) = LOG_FILE.lock() {
                *log_file = Some(file);
            }
        }
    }

    if let Ok(mut cfg) = LOG_CONFIG.lock() {
        *cfg = config;
    }
}

/// Log one structured event.
pub fn log_event(level: LogLevel, component: &str, event: &str, data: serde_json::Value) {
    let config = match LOG_CONFIG.lock() {
        Ok(guard) => guard.clone(),
        Err(_) => LogConfig::default(),
    };

    if level < config.min_level {
        return;
    }

    let entry = LogEntry {
        timestamp: Utc::now(),
        level: level.as_str().to_string(),
        component: component.to_string(),
        event: event.to_string(),
        data: if data.is_null() { None } else { Some(data) },
    };

    let line = match serde_json::to_string(&entry) {
        Ok(json) => json,
        Err(_) => return,
    };

    if config.stderr_output {
        eprintln!("{}", line);
    }

    if let Ok(mut log_file) = LOG_FILE.lock() {
        if let Some(file) = log_file.as_mut() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_entry_serialization() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level: "info".to_string(),
            component: "MATCHER".to_string(),
            event: "intent_match".to_string(),
            data: Some(serde_json::json!({"intent": "list_files"})),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"component\":\"MATCHER\""));
        assert!(json.contains("list_files"));
    }

    #[test]
    fn test_null_data_is_skipped() {
        log_event(
            LogLevel::Debug,
            "TEST",
            "below_min_level",
            serde_json::Value::Null,
        );
    }
}
