//! Intent pattern library for lingo_core
//!
//! A fixed, ordered table of recognized user goals. Each intent carries
//! match patterns (case-insensitive, substring search), one command
//! template per platform family, and explicit per-placeholder defaults.
//! The table is compiled once at startup; a template that references an
//! undeclared placeholder is rejected at load time.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declaration of one intent in the static table.
#[derive(Debug)]
pub struct IntentDef {
    pub id: &'static str,
    pub description: &'static str,
    /// Ordered match patterns. First match wins within the intent.
    pub patterns: &'static [&'static str],
    pub posix_template: &'static str,
    pub windows_template: &'static str,
    /// Ordered placeholders; position i is filled from capture group i.
    pub placeholders: &'static [PlaceholderDef],
    /// Handled by the builtin dispatcher instead of shell execution.
    pub builtin: bool,
}

#[derive(Debug)]
pub struct PlaceholderDef {
    pub name: &'static str,
    pub default: &'static str,
}

/// A successful match: which intent, what was captured, which pattern won.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedMatch {
    pub intent_id: String,
    /// Captured parameters in placeholder order. Unmatched optional
    /// groups are present as empty strings.
    pub params: Vec<String>,
    pub pattern: String,
}

#[derive(Debug, Error)]
pub enum IntentLoadError {
    #[error("intent `{intent}`: invalid pattern `{pattern}`: {message}")]
    BadPattern {
        intent: String,
        pattern: String,
        message: String,
    },
    #[error("intent `{intent}`: template references undeclared placeholder `{name}`")]
    UndeclaredPlaceholder { intent: String, name: String },
}

/// An intent with its patterns compiled.
#[derive(Debug)]
pub struct CompiledIntent {
    pub def: &'static IntentDef,
    patterns: Vec<Regex>,
}

/// The compiled pattern library. Matching is pure and deterministic:
/// first intent in table order, first pattern in intent order.
#[derive(Debug)]
pub struct IntentLibrary {
    intents: Vec<CompiledIntent>,
}

impl IntentLibrary {
    /// Compile the built-in intent table.
    pub fn load() -> Result<Self, IntentLoadError> {
        Self::compile(INTENT_TABLE)
    }

    fn compile(defs: &'static [IntentDef]) -> Result<Self, IntentLoadError> {
        let placeholder_re =
            Regex::new(r"\{\{(\w+)\}\}").map_err(|e| IntentLoadError::BadPattern {
                intent: String::new(),
                pattern: String::new(),
                message: e.to_string(),
            })?;

        let mut intents = Vec::with_capacity(defs.len());
        for def in defs {
            for template in [def.posix_template, def.windows_template] {
                for caps in placeholder_re.captures_iter(template) {
                    let name = caps
                        .get(1)
                        .map(|m| m.as_str())
                        .unwrap_or_default();
                    if !def.placeholders.iter().any(|p| p.name == name) {
                        return Err(IntentLoadError::UndeclaredPlaceholder {
                            intent: def.id.to_string(),
                            name: name.to_string(),
                        });
                    }
                }
            }

            let mut patterns = Vec::with_capacity(def.patterns.len());
            for source in def.patterns {
                let regex = RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| IntentLoadError::BadPattern {
                        intent: def.id.to_string(),
                        pattern: source.to_string(),
                        message: e.to_string(),
                    })?;
                patterns.push(regex);
            }

            intents.push(CompiledIntent { def, patterns });
        }

        Ok(Self { intents })
    }

    /// Match free-text input against the table. Returns the winning intent
    /// and the parsed capture groups, or `None` when nothing matches.
    pub fn find(&self, input: &str) -> Option<(&CompiledIntent, ParsedMatch)> {
        let input = input.trim();
        for intent in &self.intents {
            for regex in &intent.patterns {
                if let Some(caps) = regex.captures(input) {
                    let params = caps
                        .iter()
                        .skip(1)
                        .map(|group| {
                            group
                                .map(|m| m.as_str().trim().to_string())
                                .unwrap_or_default()
                        })
                        .collect();
                    return Some((
                        intent,
                        ParsedMatch {
                            intent_id: intent.def.id.to_string(),
                            params,
                            pattern: regex.as_str().to_string(),
                        },
                    ));
                }
            }
        }
        None
    }

    /// Convenience wrapper returning just the parsed match.
    pub fn match_input(&self, input: &str) -> Option<ParsedMatch> {
        self.find(input).map(|(_, parsed)| parsed)
    }

    pub fn get(&self, id: &str) -> Option<&CompiledIntent> {
        self.intents.iter().find(|i| i.def.id == id)
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

/// The built-in table. Order matters: more specific intents come before
/// broader ones so ties resolve predictably.
static INTENT_TABLE: &[IntentDef] = &[
    IntentDef {
        id: "list_files",
        description: "List files in the current directory",
        patterns: &[
            r"(?:show|list|display)(?:\s+me)?(?:\s+all)?(?:\s+the)?\s+files",
            r"what(?:'s|\s+is)\s+(?:in|inside)\s+(?:this|the)\s+(?:folder|directory)",
        ],
        posix_template: "ls -la",
        windows_template: "dir",
        placeholders: &[],
        builtin: false,
    },
    IntentDef {
        id: "change_directory",
        description: "Change the working directory",
        patterns: &[
            r"(?:go|move|navigate|switch)\s+(?:in)?to\s+(?:the\s+)?(.+?)\s+(?:folder|directory)",
            r"(?:change|set)\s+(?:the\s+)?(?:current\s+)?(?:directory|folder)\s+to\s+(.+)",
            r"(?:go|move|navigate|switch)\s+(?:in)?to\s+(.+)",
        ],
        posix_template: "",
        windows_template: "",
        placeholders: &[PlaceholderDef {
            name: "target",
            default: "~",
        }],
        builtin: true,
    },
    IntentDef {
        id: "current_directory",
        description: "Print the current directory",
        patterns: &[
            r"where\s+am\s+i",
            r"current\s+(?:directory|folder|path)",
            r"(?:print\s+)?working\s+directory",
        ],
        posix_template: "pwd",
        windows_template: "cd",
        placeholders: &[],
        builtin: false,
    },
    IntentDef {
        id: "show_file",
        description: "Print the contents of a file",
        patterns: &[
            r"(?:show|display|print|read)(?:\s+me)?\s+(?:the\s+)?contents?\s+of\s+(\S+)",
            r"(?:open|view)\s+(?:the\s+file\s+)?(\S+\.\w+)",
        ],
        posix_template: "cat {{filename}}",
        windows_template: "type {{filename}}",
        placeholders: &[PlaceholderDef {
            name: "filename",
            default: "newfile.txt",
        }],
        builtin: false,
    },
    IntentDef {
        id: "create_file",
        description: "Create an empty file",
        patterns: &[
            r"(?:create|make|touch)\s+(?:a\s+)?(?:new\s+)?(?:empty\s+)?file(?:\s+(?:called|named))?\s*(\S+)?",
        ],
        posix_template: "touch {{filename}}",
        windows_template: "type nul > {{filename}}",
        placeholders: &[PlaceholderDef {
            name: "filename",
            default: "newfile.txt",
        }],
        builtin: false,
    },
    IntentDef {
        id: "create_directory",
        description: "Create a directory",
        patterns: &[
            r"(?:create|make)\s+(?:a\s+)?(?:new\s+)?(?:directory|folder)(?:\s+(?:called|named))?\s*(\S+)?",
        ],
        posix_template: "mkdir -p {{dirname}}",
        windows_template: "mkdir {{dirname}}",
        placeholders: &[PlaceholderDef {
            name: "dirname",
            default: "new_folder",
        }],
        builtin: false,
    },
    IntentDef {
        id: "delete_file",
        description: "Delete a single file",
        patterns: &[
            r"(?:delete|remove)\s+(?:the\s+)?file\s+(\S+)",
            r"(?:delete|remove)\s+(\S+\.\w+)",
        ],
        posix_template: "rm {{filename}}",
        windows_template: "del {{filename}}",
        placeholders: &[PlaceholderDef {
            name: "filename",
            default: "newfile.txt",
        }],
        builtin: false,
    },
    IntentDef {
        id: "find_files",
        description: "Find files by kind or name pattern",
        patterns: &[
            r"(?:find|search\s+for|locate)\s+(?:all\s+)?(?:the\s+)?(\w+)\s+files",
            r"(?:find|search\s+for|locate)\s+files\s+(?:named|called|matching)\s+(\S+)",
        ],
        posix_template: "find . -name \"{{pattern}}\"",
        windows_template: "dir /s /b {{pattern}}",
        placeholders: &[PlaceholderDef {
            name: "pattern",
            default: "*",
        }],
        builtin: false,
    },
    IntentDef {
        id: "copy_file",
        description: "Copy a file",
        patterns: &[r"copy\s+(?:the\s+file\s+)?(\S+)\s+(?:to|into)\s+(\S+)"],
        posix_template: "cp {{source}} {{dest}}",
        windows_template: "copy {{source}} {{dest}}",
        placeholders: &[
            PlaceholderDef {
                name: "source",
                default: "newfile.txt",
            },
            PlaceholderDef {
                name: "dest",
                default: ".",
            },
        ],
        builtin: false,
    },
    IntentDef {
        id: "move_file",
        description: "Move or rename a file",
        patterns: &[r"(?:move|rename)\s+(?:the\s+file\s+)?(\S+)\s+(?:to|into)\s+(\S+)"],
        posix_template: "mv {{source}} {{dest}}",
        windows_template: "move {{source}} {{dest}}",
        placeholders: &[
            PlaceholderDef {
                name: "source",
                default: "newfile.txt",
            },
            PlaceholderDef {
                name: "dest",
                default: ".",
            },
        ],
        builtin: false,
    },
    IntentDef {
        id: "disk_usage",
        description: "Report disk usage",
        patterns: &[
            r"(?:disk|storage)\s+(?:usage|space)",
            r"how\s+much\s+(?:disk\s+)?space",
            r"free\s+space",
        ],
        posix_template: "df -h",
        windows_template: "wmic logicaldisk get size,freespace,caption",
        placeholders: &[],
        builtin: false,
    },
    IntentDef {
        id: "memory_usage",
        description: "Report memory usage",
        patterns: &[
            r"(?:memory|ram)\s+usage",
            r"how\s+much\s+(?:memory|ram)",
        ],
        posix_template: "free -m",
        windows_template: "wmic os get freephysicalmemory,totalvisiblememorysize",
        placeholders: &[],
        builtin: false,
    },
    IntentDef {
        id: "list_processes",
        description: "List running processes",
        patterns: &[
            r"(?:show|list)\s+(?:running\s+)?processes",
            r"what(?:'s|\s+is)\s+running",
        ],
        posix_template: "ps aux",
        windows_template: "tasklist",
        placeholders: &[],
        builtin: false,
    },
    IntentDef {
        id: "system_info",
        description: "Report operating system information",
        patterns: &[
            r"system\s+info(?:rmation)?",
            r"(?:os|operating\s+system)\s+(?:version|info)",
        ],
        posix_template: "uname -a",
        windows_template: "ver",
        placeholders: &[],
        builtin: false,
    },
    IntentDef {
        id: "word_count",
        description: "Count words and lines in a file",
        patterns: &[r"(?:count|how\s+many)\s+(?:words|lines)\s+in\s+(\S+)"],
        posix_template: "wc {{filename}}",
        windows_template: "find /c /v \"\" {{filename}}",
        placeholders: &[PlaceholderDef {
            name: "filename",
            default: "newfile.txt",
        }],
        builtin: false,
    },
];
