//! # Error Types
//!
//! Errors loading validator inputs: configuration files and the data
//! behind the in-memory collaborators. Validation findings are never
//! errors; they are catalog messages.

use thiserror::Error;

/// Error loading a configuration, ontology, alias or test case file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML (or JSON) of the expected shape.
    #[error("cannot parse {what}: {source}")]
    Parse {
        /// What was being parsed.
        what: &'static str,
        /// Parser error.
        #[source]
        source: serde_yaml::Error,
    },
}

impl LoadError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Read and deserialize a YAML (or JSON) file.
pub(crate) fn load_yaml_file<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
    what: &'static str,
) -> Result<T, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    serde_yaml::from_str(&text).map_err(|source| LoadError::Parse { what, source })
}
