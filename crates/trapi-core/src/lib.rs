//! # trapi-core — Validation Message Catalog
//!
//! Every check performed against a TRAPI response ends up here, as a
//! message recorded in a [`MessageCatalog`]. The catalog is the only
//! output channel of the validator: schema violations, ontology
//! mismatches and missing test edges are all catalog entries, never
//! `Err` values handed back to the caller.
//!
//! ## Key Design Principles
//!
//! 1. **Registered codes only.** A message code is a dotted path such as
//!    `error.trapi.response.message.empty`. Its first segment is the
//!    [`Severity`] and the full path must exist in the [`CodeRegistry`].
//!    Reporting an unregistered code is a programmer error.
//!
//! 2. **Typed messages.** A [`Message`] carries an explicit, optional
//!    identifier plus an ordered list of parameters. The identifier is the
//!    per-occurrence key; the parameters distinguish repeated occurrences.
//!
//! 3. **Insertion order everywhere.** Targets, tests, codes, source trails,
//!    identifiers and parameter keys all keep first-insertion order, so the
//!    rendered report is deterministic.
//!
//! 4. **Merge is the composition primitive.** Sub-validations write into
//!    their own catalog and are merged into the parent. Merging is not
//!    commutative for identifiers present on both sides: parameter lists
//!    are concatenated receiver-first.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `trapi-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No I/O. Rendering produces strings; the caller decides where they go.

pub mod catalog;
pub mod codes;
pub mod error;
pub mod render;
pub mod severity;

pub use catalog::{
    CodedMessages, IdentifiedMessages, Message, MessageCatalog, MessagesByTarget, MessagesByTest,
    Occurrences, Parameters, ScopedMessages, SeverityPartitions, DEFAULT_SOURCE_TRAIL,
    DEFAULT_TARGET, DEFAULT_TEST,
};
pub use codes::{CodeEntry, CodeRegistry};
pub use error::{CatalogError, RegistryError};
pub use render::{Rendered, RenderOptions};
pub use severity::Severity;
