//! # Structural Validation
//!
//! Validates TRAPI documents and their components against the JSON Schema
//! derived from a TRAPI release (Draft 2020-12 semantics).
//!
//! ## Schema Resolution
//!
//! A [`TrapiSchema`] holds every component of one TRAPI document, already
//! converted by [`crate::openapi`]. Component references have the form
//! `#/components/schemas/<Name>` and resolve inside the component document
//! itself, which carries the full `components.schemas` section. Any other
//! `$ref` is answered locally with a permissive schema, so compilation
//! never reaches the network.
//!
//! Validators are compiled on first use and cached per component.
//!
//! ## Seams
//!
//! The pipeline consumes structural validation through
//! [`StructuralValidator`]. [`SchemaLibrary`] is the production
//! implementation: it loads one [`TrapiSchema`] per version through a
//! [`SchemaSource`] (normally [`crate::SchemaFetcher`]) and caches it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::openapi::component_schemas;
use crate::version::VersionSelector;

/// Reasons longer than this are abbreviated for reporting.
pub const MAX_REASON_CHARS: usize = 160;
const REASON_HEAD_CHARS: usize = 49;
const REASON_TAIL_CHARS: usize = 100;

/// Answers every `$ref` outside the component document with a schema that
/// accepts anything.
struct LocalComponentRetriever;

impl Retrieve for LocalComponentRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(uri = uri.as_str(), "unresolved external $ref treated as permissive");
        Ok(serde_json::json!({}))
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Shorten a violation message for reporting.
///
/// Messages of at most [`MAX_REASON_CHARS`] characters are kept. Longer
/// ones keep their first 49 characters and the 99 characters before the
/// last one, joined by an elision marker.
pub fn abbreviate_reason(reason: &str) -> String {
    let chars: Vec<char> = reason.chars().collect();
    if chars.len() <= MAX_REASON_CHARS {
        return reason.to_string();
    }
    let head: String = chars[..REASON_HEAD_CHARS].iter().collect();
    let tail: String = chars[chars.len() - REASON_TAIL_CHARS..chars.len() - 1]
        .iter()
        .collect();
    format!("{head}     ...      {tail}")
}

// ─── TrapiSchema ────────────────────────────────────────────────────

/// The converted component schemas of one TRAPI version.
pub struct TrapiSchema {
    version: VersionSelector,
    components: Map<String, Value>,
    compiled: Mutex<HashMap<String, Arc<Validator>>>,
}

impl fmt::Debug for TrapiSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrapiSchema")
            .field("version", &self.version)
            .field("components", &self.components.len())
            .finish()
    }
}

impl TrapiSchema {
    /// Build from a parsed OpenAPI document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingComponents`] if the document has no
    /// component schemas.
    pub fn from_openapi(document: Value, version: VersionSelector) -> Result<Self, SchemaError> {
        let components = component_schemas(document, &version)?;
        tracing::debug!(version = %version, components = components.len(), "loaded TRAPI schema");
        Ok(Self {
            version,
            components,
            compiled: Mutex::new(HashMap::new()),
        })
    }

    /// Build from OpenAPI YAML (or JSON) text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] for malformed text, otherwise as
    /// [`from_openapi`](Self::from_openapi).
    pub fn from_yaml_str(text: &str, version: VersionSelector) -> Result<Self, SchemaError> {
        let parse_error = |reason: String| SchemaError::Parse {
            source_name: version.to_string(),
            reason,
        };
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| parse_error(format!("invalid YAML: {e}")))?;
        let document = yaml_to_json_value(&yaml)
            .map_err(|e| parse_error(format!("YAML-to-JSON conversion failed: {e}")))?;
        Self::from_openapi(document, version)
    }

    /// The version this schema was loaded for.
    pub fn version(&self) -> &VersionSelector {
        &self.version
    }

    /// Component names, in document order.
    pub fn component_names(&self) -> Vec<&str> {
        self.components.keys().map(String::as_str).collect()
    }

    /// Converted schema of one component.
    pub fn component(&self, name: &str) -> Option<&Value> {
        self.components.get(name)
    }

    /// Compiled validator for a component.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownComponent`] or [`SchemaError::Compile`].
    pub fn validator(&self, component: &str) -> Result<Arc<Validator>, SchemaError> {
        if let Some(compiled) = self.cache().get(component) {
            return Ok(Arc::clone(compiled));
        }

        let schema = self
            .components
            .get(component)
            .ok_or_else(|| SchemaError::UnknownComponent {
                version: self.version.to_string(),
                component: component.to_string(),
            })?;

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.with_retriever(LocalComponentRetriever);
        let validator = opts.build(schema).map_err(|e| SchemaError::Compile {
            component: component.to_string(),
            reason: e.to_string(),
        })?;

        let validator = Arc::new(validator);
        self.cache()
            .insert(component.to_string(), Arc::clone(&validator));
        Ok(validator)
    }

    /// Every violation of `instance` against a component; empty when valid.
    ///
    /// # Errors
    ///
    /// As [`validator`](Self::validator).
    pub fn violations(&self, instance: &Value, component: &str) -> Result<Vec<Violation>, SchemaError> {
        let validator = self.validator(component)?;
        let violations = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        Ok(violations)
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Arc<Validator>>> {
        self.compiled.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// OpenAPI documents use unquoted HTTP status codes as mapping keys; those
/// and boolean keys are stringified.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

// ─── Seams ──────────────────────────────────────────────────────────

/// Structural validation as consumed by the validation pipeline.
pub trait StructuralValidator {
    /// Validate `instance` against `component` of the given TRAPI version
    /// and return the (abbreviated) reasons it does not conform. An empty
    /// list means the instance is valid.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when the schema itself cannot be obtained
    /// or compiled; non-conformance is never an error.
    fn validate(
        &self,
        instance: &Value,
        component: &str,
        version: &VersionSelector,
    ) -> Result<Vec<String>, SchemaError>;
}

/// Where [`SchemaLibrary`] obtains schemas it has not loaded yet.
pub trait SchemaSource {
    /// Load the schema for a version.
    fn load(&self, version: &VersionSelector) -> Result<TrapiSchema, SchemaError>;
}

/// Per-version schema cache backed by an optional [`SchemaSource`].
#[derive(Default)]
pub struct SchemaLibrary {
    source: Option<Box<dyn SchemaSource + Send + Sync>>,
    schemas: Mutex<HashMap<VersionSelector, Arc<TrapiSchema>>>,
}

impl fmt::Debug for SchemaLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaLibrary")
            .field("has_source", &self.source.is_some())
            .field("loaded", &self.loaded().len())
            .finish()
    }
}

impl SchemaLibrary {
    /// A library loading missing schemas from `source`.
    pub fn new(source: impl SchemaSource + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            schemas: Mutex::new(HashMap::new()),
        }
    }

    /// A library holding exactly the given schemas.
    pub fn offline(schemas: impl IntoIterator<Item = TrapiSchema>) -> Self {
        let library = Self::default();
        for schema in schemas {
            library.insert(schema);
        }
        library
    }

    /// Add (or replace) a loaded schema.
    pub fn insert(&self, schema: TrapiSchema) {
        self.loaded()
            .insert(schema.version().clone(), Arc::new(schema));
    }

    /// The schema for a version, loading it on first request.
    ///
    /// # Errors
    ///
    /// Returns the source's error, or [`SchemaError::Parse`] when no
    /// source is configured and the version was never inserted.
    pub fn schema(&self, version: &VersionSelector) -> Result<Arc<TrapiSchema>, SchemaError> {
        if let Some(schema) = self.loaded().get(version) {
            return Ok(Arc::clone(schema));
        }
        let source = self.source.as_ref().ok_or_else(|| SchemaError::Parse {
            source_name: version.to_string(),
            reason: "no schema source configured and schema not preloaded".to_string(),
        })?;
        let schema = match source.load(version) {
            Ok(schema) => Arc::new(schema),
            Err(e) => {
                tracing::error!(version = %version, error = %e, "TRAPI schema unavailable");
                return Err(e);
            }
        };
        self.loaded().insert(version.clone(), Arc::clone(&schema));
        Ok(schema)
    }

    fn loaded(&self) -> MutexGuard<'_, HashMap<VersionSelector, Arc<TrapiSchema>>> {
        self.schemas.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StructuralValidator for SchemaLibrary {
    fn validate(
        &self,
        instance: &Value,
        component: &str,
        version: &VersionSelector,
    ) -> Result<Vec<String>, SchemaError> {
        let schema = self.schema(version)?;
        let violations = schema.violations(instance, component)?;
        if !violations.is_empty() {
            tracing::debug!(
                version = %version,
                component,
                violations = violations.len(),
                "structural validation failed"
            );
        }
        Ok(violations
            .into_iter()
            .map(|v| abbreviate_reason(&v.message))
            .collect())
    }
}
