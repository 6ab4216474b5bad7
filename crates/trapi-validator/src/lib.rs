//! # trapi-validator — TRAPI Response Validation
//!
//! Validates Translator Reasoner API responses and checks that they
//! witness expected test case edges. All findings are reported into a
//! [`trapi_core::MessageCatalog`]; the verdict is "no error and no
//! critical message".
//!
//! ## Modules
//!
//! - [`pipeline`]: [`ResponseValidator`], the staged validation of one
//!   response (presence, envelope structure, status, query graph,
//!   knowledge graph, results).
//! - [`matcher`]: [`EdgeMatcher`], the ontology-aware search for a test
//!   case triple in the knowledge graph and results.
//! - [`graph`]: shape and ontology compliance of query and knowledge graphs.
//! - [`sample`]: bounded, deterministic knowledge graph and result samples.
//! - [`collaborators`]: the ontology, identity and mapping seams, with
//!   in-memory implementations.
//! - [`config`]: [`ValidatorConfig`].
//!
//! ## Crate Policy
//!
//! - The response document is borrowed, never mutated.
//! - No network access. Schemas arrive through the
//!   [`trapi_schema::StructuralValidator`] seam.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod pipeline;
pub mod sample;

pub use collaborators::{
    IdentityResolver, MappingChecker, NodeEdgeMappingChecker, Ontology, StaticAliases,
    StaticOntology,
};
pub use config::ValidatorConfig;
pub use error::LoadError;
pub use graph::{GraphChecker, GraphKind};
pub use matcher::{BindingShape, EdgeMatcher, EdgeWitness, TestCase};
pub use pipeline::{ResponseValidator, Stage, ValidationReport};
pub use sample::GraphSample;
