//! # OpenAPI to JSON Schema
//!
//! TRAPI publishes its components as an OpenAPI 3.0 document. The JSON
//! Schema validator needs plain JSON Schema, so each component schema is
//! rewritten in place before compilation:
//!
//! - `nullable: true` becomes a `oneOf` (or `anyOf`) alternative of
//!   `{"type": "null"}`, wrapping the schema when it has neither.
//! - Releases before 1.4.0-beta tag polymorphic schemata with `allOf` where
//!   `oneOf` is meant; the keyword is renamed for those releases.
//! - Releases 1.4.0-beta3 through 1.4.0 describe the `auxiliary_graphs`
//!   value with a `oneOf` that cannot validate; it is replaced by an
//!   object whose values follow the first alternative.
//!
//! Each component is then extracted with the full `components.schemas`
//! section embedded under itself, so `#/components/schemas/<Name>`
//! references resolve against the component document.

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::version::{trapi_1_4_0, trapi_1_4_0_beta, trapi_1_4_0_beta3, VersionSelector};

/// Which release-specific rewrites apply to a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    /// Rename `allOf` to `oneOf`.
    pub all_of_as_one_of: bool,
    /// Rewrite the `auxiliary_graphs` property schema.
    pub auxiliary_graphs_patch: bool,
}

impl Conversion {
    /// Rewrites for the given schema version. Branches and local files are
    /// taken as current and get neither release patch.
    pub fn for_version(version: &VersionSelector) -> Self {
        match version.release() {
            Some(release) => Self {
                all_of_as_one_of: !release.is_at_least(&trapi_1_4_0_beta()),
                auxiliary_graphs_patch: release.is_at_least(&trapi_1_4_0_beta3())
                    && trapi_1_4_0().is_at_least(release),
            },
            None => Self {
                all_of_as_one_of: false,
                auxiliary_graphs_patch: false,
            },
        }
    }
}

/// Rewrite one OpenAPI schema object into JSON Schema, recursively.
pub fn openapi_to_jsonschema(schema: &mut Value, conversion: Conversion) {
    let Some(object) = schema.as_object_mut() else {
        return;
    };

    if conversion.all_of_as_one_of {
        if let Some(all_of) = object.remove("allOf") {
            object.insert("oneOf".to_string(), all_of);
        }
    }

    let kind = object.get("type").and_then(Value::as_str).map(str::to_owned);
    match kind.as_deref() {
        Some("object") => {
            if let Some(Value::Object(properties)) = object.get_mut("properties") {
                for (name, property) in properties.iter_mut() {
                    if conversion.auxiliary_graphs_patch && name == "auxiliary_graphs" {
                        patch_auxiliary_graphs(property);
                    }
                    openapi_to_jsonschema(property, conversion);
                }
            }
            if let Some(additional) = object.get_mut("additionalProperties") {
                openapi_to_jsonschema(additional, conversion);
            }
        }
        Some("array") => {
            if let Some(items) = object.get_mut("items") {
                openapi_to_jsonschema(items, conversion);
            }
        }
        _ => {}
    }

    for keyword in ["oneOf", "anyOf", "allOf"] {
        if let Some(Value::Array(alternatives)) = object.get_mut(keyword) {
            for alternative in alternatives {
                openapi_to_jsonschema(alternative, conversion);
            }
        }
    }

    if object.remove("nullable").and_then(|v| v.as_bool()) == Some(true) {
        fix_nullable(object);
    }
}

fn fix_nullable(object: &mut Map<String, Value>) {
    let null = serde_json::json!({ "type": "null" });
    for keyword in ["oneOf", "anyOf"] {
        if let Some(Value::Array(alternatives)) = object.get_mut(keyword) {
            alternatives.push(null);
            return;
        }
    }
    let original = std::mem::take(object);
    object.insert(
        "oneOf".to_string(),
        Value::Array(vec![Value::Object(original), null]),
    );
}

fn patch_auxiliary_graphs(property: &mut Value) {
    let Some(object) = property.as_object_mut() else {
        return;
    };
    if let Some(Value::Array(mut alternatives)) = object.remove("oneOf") {
        object.insert("type".to_string(), Value::from("object"));
        if !alternatives.is_empty() {
            object.insert("additionalProperties".to_string(), alternatives.swap_remove(0));
        }
    }
}

/// Convert every component of an OpenAPI document and return them by name,
/// each with the converted `components.schemas` section embedded.
///
/// # Errors
///
/// Returns [`SchemaError::MissingComponents`] when the document has no
/// `components.schemas` object.
pub fn component_schemas(
    mut document: Value,
    version: &VersionSelector,
) -> Result<Map<String, Value>, SchemaError> {
    let missing = || SchemaError::MissingComponents(version.to_string());
    let mut components = match document
        .get_mut("components")
        .and_then(|c| c.get_mut("schemas"))
        .map(Value::take)
    {
        Some(Value::Object(components)) => components,
        _ => return Err(missing()),
    };

    let conversion = Conversion::for_version(version);
    for schema in components.values_mut() {
        openapi_to_jsonschema(schema, conversion);
    }

    let embedded = serde_json::json!({ "schemas": Value::Object(components.clone()) });
    for schema in components.values_mut() {
        if let Some(object) = schema.as_object_mut() {
            object.insert("components".to_string(), embedded.clone());
        }
    }
    Ok(components)
}
