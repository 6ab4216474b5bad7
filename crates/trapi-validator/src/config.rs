//! Validator configuration.
//!
//! Every field has a default, so an empty YAML document (or `{}`) is a
//! valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{load_yaml_file, LoadError};

/// Settings of one [`crate::ResponseValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// TRAPI version reference (release, shorthand, branch or schema file).
    /// `None` validates against the latest known release, or against the
    /// response's own `schema_version` when it declares one.
    pub trapi_version: Option<String>,
    /// Biolink model version. `None` accepts the response's declaration.
    pub biolink_version: Option<String>,
    /// Knowledge graph edges to validate (0 = all).
    pub max_kg_edges: usize,
    /// Results to validate (0 = all).
    pub max_results: usize,
    /// Do not report missing or empty message parts.
    pub suppress_empty_data_warnings: bool,
    /// Run graph compliance checks on the query and knowledge graphs.
    pub validate_ontology: bool,
    /// Target recorded for messages. `None` uses the catalog default.
    pub default_target: Option<String>,
    /// Test recorded for messages. `None` uses the catalog default.
    pub default_test: Option<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            trapi_version: None,
            biolink_version: None,
            max_kg_edges: 0,
            max_results: 0,
            suppress_empty_data_warnings: false,
            validate_ontology: true,
            default_target: None,
            default_test: None,
        }
    }
}

impl ValidatorConfig {
    /// Parse a YAML or JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] for malformed documents or unknown keys.
    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        serde_yaml::from_str(text).map_err(|source| LoadError::Parse {
            what: "validator configuration",
            source,
        })
    }

    /// Load a YAML or JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] or [`LoadError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        load_yaml_file(path, "validator configuration")
    }
}
