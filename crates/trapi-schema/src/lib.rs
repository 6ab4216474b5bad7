//! # trapi-schema — TRAPI Versions and Structural Validation
//!
//! Everything needed to turn a version reference such as `"1.4"`,
//! `"master"` or `"./my_schema.yaml"` into a compiled validator for the
//! components of the Translator Reasoner API.
//!
//! ## Modules
//!
//! - [`version`]: release parsing and ordering, the shorthand table built
//!   from the published release list, and [`VersionSelector`].
//! - [`openapi`]: conversion of the OpenAPI component schemas into plain
//!   JSON Schema (`nullable`, legacy `allOf`, known release patches).
//! - [`validate`]: [`TrapiSchema`] (compiled per-component validators), the
//!   [`StructuralValidator`] seam used by the validation pipeline, and
//!   [`SchemaLibrary`], which loads schemas per version on demand.
//! - [`fetch`] and [`config`]: retrieval of schema documents and release
//!   lists from GitHub (or local files) with an explicit timeout.
//!
//! ## Crate Policy
//!
//! - Network access happens only in [`fetch`]. Schema compilation never
//!   reaches the network: `$ref`s are resolved from the loaded document.
//! - No retries. A failed retrieval is a typed [`FetchError`].

pub mod config;
pub mod error;
pub mod fetch;
pub mod openapi;
pub mod validate;
pub mod version;

pub use config::{ConfigError, FetchConfig};
pub use error::{FetchError, SchemaError, VersionError};
pub use fetch::SchemaFetcher;
pub use validate::{
    abbreviate_reason, SchemaLibrary, SchemaSource, StructuralValidator, TrapiSchema, Violation,
};
pub use version::{
    PartialVersion, SemVer, VersionResolver, VersionSelector, KNOWN_TRAPI_BRANCHES,
    KNOWN_TRAPI_RELEASES,
};
