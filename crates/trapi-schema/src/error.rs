//! # Error Types
//!
//! Version resolution, schema loading and schema retrieval errors.
//! Transport failures carry the URL they concern; timeouts are kept
//! distinct from other transport errors so callers can report them as such.

use thiserror::Error;

/// Error parsing or resolving a version reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The string does not match the release version grammar.
    #[error("'{0}' is not a valid release version")]
    InvalidVersion(String),

    /// A concrete version was required but minor or patch is missing.
    #[error("'{0}' is missing minor and/or patch versions")]
    UnderspecifiedVersion(String),

    /// Neither a known release, a registered shorthand, a known branch nor
    /// a schema file path.
    #[error("no known TRAPI release, branch or schema file matches '{0}'")]
    UnresolvedVersion(String),
}

/// Error retrieving a schema document or release list.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// The request failed below HTTP (DNS, TLS, connection reset, ...).
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying error text.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("response from {url} could not be decoded: {reason}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder error text.
        reason: String,
    },

    /// A local schema file could not be read.
    #[error("cannot read schema file '{path}': {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {0}")]
    Client(String),

    /// A URL could not be built from the configured base.
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
}

/// Error loading, converting or compiling a TRAPI schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The schema document is not valid YAML or JSON.
    #[error("schema document '{source_name}' could not be parsed: {reason}")]
    Parse {
        /// Version, URL or path the document came from.
        source_name: String,
        /// Parser error text.
        reason: String,
    },

    /// The document has no `components.schemas` section.
    #[error("schema document '{0}' has no components.schemas section")]
    MissingComponents(String),

    /// The requested component is not defined by the schema.
    #[error("TRAPI schema '{version}' has no component '{component}'")]
    UnknownComponent {
        /// Schema version.
        version: String,
        /// Requested component name.
        component: String,
    },

    /// The component schema could not be compiled.
    #[error("validator build error for component '{component}': {reason}")]
    Compile {
        /// Component name.
        component: String,
        /// Compiler error text.
        reason: String,
    },
}
