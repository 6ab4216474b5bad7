//! # Code Registry
//!
//! The registry of message codes. Codes live in a nested YAML document
//! (`codes.yaml`, embedded at compile time) where every mapping that
//! carries a `$message` key is a leaf:
//!
//! ```yaml
//! error:
//!   trapi:
//!     response:
//!       empty:
//!         $message: "Response is empty"
//!         $description: "The response is missing or has no 'message' envelope."
//! ```
//!
//! The dotted path to the leaf (`error.trapi.response.empty`) is the code.
//! The first segment must be a [`Severity`] name.

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::error::RegistryError;
use crate::severity::Severity;

const MESSAGE_KEY: &str = "$message";
const DESCRIPTION_KEY: &str = "$description";

static BUILTIN_CODES: &str = include_str!("../codes.yaml");

/// One registered message code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    /// Full dotted code.
    pub code: String,
    /// Severity named by the first code segment.
    pub severity: Severity,
    /// Message template; `{name}` placeholders are filled from parameters.
    pub template: String,
    /// Longer explanation, for generated documentation.
    pub description: String,
}

/// Registry of known message codes, in document order.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    entries: IndexMap<String, CodeEntry>,
}

impl CodeRegistry {
    /// The registry compiled into this crate.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `codes.yaml` is malformed. The document is
    /// covered by this crate's tests, so this indicates a broken build.
    pub fn builtin() -> Arc<CodeRegistry> {
        static REGISTRY: OnceLock<Arc<CodeRegistry>> = OnceLock::new();
        REGISTRY
            .get_or_init(|| match CodeRegistry::from_yaml(BUILTIN_CODES) {
                Ok(registry) => Arc::new(registry),
                Err(e) => panic!("embedded codes.yaml is malformed: {e}"),
            })
            .clone()
    }

    /// Parse a registry document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Parse`] for invalid YAML,
    /// [`RegistryError::UnknownSeverity`] when a top-level branch is not a
    /// severity name, and [`RegistryError::InvalidEntry`] for leaves whose
    /// `$message` or `$description` is not a string.
    pub fn from_yaml(text: &str) -> Result<Self, RegistryError> {
        let root: Value = serde_yaml::from_str(text)?;
        let Value::Mapping(root) = root else {
            return Err(RegistryError::InvalidEntry {
                path: String::new(),
                reason: "registry root must be a mapping".to_string(),
            });
        };

        let mut registry = CodeRegistry::default();
        for (key, subtree) in &root {
            let branch = key_str(key, "")?;
            let severity: Severity = branch.parse()?;
            registry.collect(severity, branch, subtree)?;
        }
        Ok(registry)
    }

    fn collect(&mut self, severity: Severity, path: &str, node: &Value) -> Result<(), RegistryError> {
        let Value::Mapping(map) = node else {
            return Err(RegistryError::InvalidEntry {
                path: path.to_string(),
                reason: "expected a mapping".to_string(),
            });
        };

        if map.contains_key(MESSAGE_KEY) {
            let entry = CodeEntry {
                code: path.to_string(),
                severity,
                template: leaf_str(map, MESSAGE_KEY, path)?,
                description: leaf_str(map, DESCRIPTION_KEY, path)?,
            };
            self.entries.insert(entry.code.clone(), entry);
            return Ok(());
        }

        for (key, child) in map {
            let segment = key_str(key, path)?;
            self.collect(severity, &format!("{path}.{segment}"), child)?;
        }
        Ok(())
    }

    /// Look up a code.
    pub fn lookup(&self, code: &str) -> Option<&CodeEntry> {
        self.entries.get(code)
    }

    /// Whether a code is registered.
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Message template of a code, if registered.
    pub fn template(&self, code: &str) -> Option<&str> {
        self.lookup(code).map(|e| e.template.as_str())
    }

    /// All entries, in document order.
    pub fn iter(&self) -> impl Iterator<Item = &CodeEntry> {
        self.entries.values()
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no codes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One-line, human-readable form of a single message.
    ///
    /// The result reads `SEVERITY - Context Path: <template>`, where the
    /// context is built from the inner code segments and `{name}`
    /// placeholders in the template are filled from `identifier` and
    /// `params`. Returns `None` for unregistered codes.
    pub fn display(
        &self,
        code: &str,
        identifier: Option<&str>,
        params: &[(String, String)],
    ) -> Option<String> {
        let entry = self.lookup(code)?;

        let normalized = code.replace('_', ".");
        let parts: Vec<&str> = normalized.split('.').collect();
        let context: Vec<String> = if parts.len() > 2 {
            parts[1..parts.len() - 1].iter().map(|p| capitalize(p)).collect()
        } else {
            Vec::new()
        };
        let context = if context.is_empty() {
            String::new()
        } else {
            format!("{}: ", context.join(" "))
        };

        let mut text = entry.template.clone();
        if let Some(id) = identifier {
            text = text.replace("{identifier}", id);
        }
        for (key, value) in params {
            text = text.replace(&format!("{{{key}}}"), value);
        }

        Some(format!(
            "{} - {context}{text}",
            entry.severity.as_str().to_uppercase()
        ))
    }

    /// Markdown dictionary of every registered code, grouped by severity.
    pub fn markdown(&self) -> String {
        let mut out = String::from("# Validation Codes Dictionary\n");
        for severity in Severity::all() {
            let mut entries = self.iter().filter(|e| e.severity == *severity).peekable();
            if entries.peek().is_none() {
                continue;
            }
            let heading = if *severity == Severity::Info {
                "Information"
            } else {
                severity.heading()
            };
            out.push_str(&format!("\n## {heading}\n"));
            for entry in entries {
                out.push_str(&format!(
                    "\n### {}\n\n**Message:** {}\n\n{}\n",
                    entry.code, entry.template, entry.description
                ));
            }
        }
        out
    }
}

fn key_str<'a>(key: &'a Value, parent: &str) -> Result<&'a str, RegistryError> {
    key.as_str().ok_or_else(|| RegistryError::InvalidEntry {
        path: parent.to_string(),
        reason: format!("non-string key {key:?}"),
    })
}

fn leaf_str(map: &Mapping, key: &str, path: &str) -> Result<String, RegistryError> {
    match map.get(key) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(RegistryError::InvalidEntry {
            path: path.to_string(),
            reason: format!("'{key}' must be a string, found {other:?}"),
        }),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
