//! # Error Types
//!
//! Errors raised by the catalog and the code registry. These are all
//! contract errors: bad input data never shows up here, it is recorded
//! as a catalog message instead.

use thiserror::Error;

/// Error loading or querying the code registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry document is not valid YAML.
    #[error("code registry is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A registry node has an unexpected shape.
    #[error("malformed code registry entry at '{path}': {reason}")]
    InvalidEntry {
        /// Dotted path of the offending node.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A top-level branch of the registry is not a severity name.
    #[error("code registry branch '{0}' is not a severity (expected info, skipped, warning, error or critical)")]
    UnknownSeverity(String),
}

/// Error recording, exporting or importing catalog messages.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The message code is not registered.
    #[error("unknown message code '{0}'")]
    UnknownCode(String),

    /// The catalog could not be (de)serialized.
    #[error("catalog serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
