//! # Message Catalog
//!
//! Hierarchical store of validation messages, keyed
//!
//! ```text
//! target -> test -> severity -> code -> source trail -> identifier -> occurrences
//! ```
//!
//! ## Invariants
//!
//! - A `(target, test)` slot holds all five severity partitions from the
//!   moment it is first touched. [`SeverityPartitions`] is a struct with one
//!   field per severity, so a partially populated slot cannot be built.
//! - An identifier reported without parameters is a presence marker
//!   ([`Occurrences::Marker`], exported as `null`). Reporting it again is a
//!   no-op.
//! - An identifier reported with parameters accumulates one parameter map
//!   per report, in report order ([`Occurrences::Listed`], exported as an
//!   array). A parameterized report upgrades an existing marker; a bare
//!   report never downgrades an existing list.
//! - Every level keeps first-insertion order.
//!
//! ## Merge Ordering
//!
//! [`MessageCatalog::merge`] appends the other catalog's parameter lists
//! after the receiver's. For identifiers present in both catalogs the
//! result therefore depends on merge order. Over disjoint keys, merging is
//! order-independent.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codes::CodeRegistry;
use crate::error::CatalogError;
use crate::severity::Severity;

/// Target used when a report does not name one.
pub const DEFAULT_TARGET: &str = "global";
/// Test used when a report does not name one.
pub const DEFAULT_TEST: &str = "test";
/// Source trail used when a report does not name one.
pub const DEFAULT_SOURCE_TRAIL: &str = "global";

/// Parameters of one occurrence, in insertion order.
pub type Parameters = IndexMap<String, String>;
/// identifier -> occurrences
pub type IdentifiedMessages = IndexMap<String, Occurrences>;
/// source trail -> identifiers
pub type ScopedMessages = IndexMap<String, IdentifiedMessages>;
/// code -> source trails
pub type CodedMessages = IndexMap<String, ScopedMessages>;
/// test -> severity partitions
pub type MessagesByTest = IndexMap<String, SeverityPartitions>;
/// target -> tests
pub type MessagesByTarget = IndexMap<String, MessagesByTest>;

// ─── Occurrences ────────────────────────────────────────────────────

/// What is recorded for one identifier under one code and source trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<Parameters>>", into = "Option<Vec<Parameters>>")]
pub enum Occurrences {
    /// The identifier was reported, with no distinguishing parameters.
    Marker,
    /// Every parameterized occurrence, in report order.
    Listed(Vec<Parameters>),
}

impl Occurrences {
    /// Parameter maps recorded so far; empty for a marker.
    pub fn parameters(&self) -> &[Parameters] {
        match self {
            Self::Marker => &[],
            Self::Listed(list) => list,
        }
    }

    /// Returns true for a presence marker.
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::Marker)
    }

    fn absorb(&mut self, other: &Occurrences) {
        match (&mut *self, other) {
            (_, Occurrences::Marker) => {}
            (Occurrences::Marker, Occurrences::Listed(theirs)) => {
                *self = Occurrences::Listed(theirs.clone());
            }
            (Occurrences::Listed(ours), Occurrences::Listed(theirs)) => {
                ours.extend(theirs.iter().cloned());
            }
        }
    }
}

impl From<Option<Vec<Parameters>>> for Occurrences {
    fn from(value: Option<Vec<Parameters>>) -> Self {
        match value {
            Some(list) => Self::Listed(list),
            None => Self::Marker,
        }
    }
}

impl From<Occurrences> for Option<Vec<Parameters>> {
    fn from(value: Occurrences) -> Self {
        match value {
            Occurrences::Marker => None,
            Occurrences::Listed(list) => Some(list),
        }
    }
}

// ─── Severity partitions ────────────────────────────────────────────

/// The five severity partitions of one `(target, test)` slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityPartitions {
    /// Informational messages.
    #[serde(default)]
    pub info: CodedMessages,
    /// Checks that were not performed.
    #[serde(default)]
    pub skipped: CodedMessages,
    /// Non-fatal findings.
    #[serde(default)]
    pub warning: CodedMessages,
    /// Verdict-failing findings.
    #[serde(default)]
    pub error: CodedMessages,
    /// Pipeline-halting findings.
    #[serde(default)]
    pub critical: CodedMessages,
}

impl SeverityPartitions {
    /// Messages of one severity.
    pub fn get(&self, severity: Severity) -> &CodedMessages {
        match severity {
            Severity::Info => &self.info,
            Severity::Skipped => &self.skipped,
            Severity::Warning => &self.warning,
            Severity::Error => &self.error,
            Severity::Critical => &self.critical,
        }
    }

    fn get_mut(&mut self, severity: Severity) -> &mut CodedMessages {
        match severity {
            Severity::Info => &mut self.info,
            Severity::Skipped => &mut self.skipped,
            Severity::Warning => &mut self.warning,
            Severity::Error => &mut self.error,
            Severity::Critical => &mut self.critical,
        }
    }

    /// Returns true if no severity holds any code.
    pub fn is_empty(&self) -> bool {
        Severity::all().iter().all(|s| self.get(*s).is_empty())
    }
}

// ─── Message ────────────────────────────────────────────────────────

/// One message to report: an optional identifier, ordered parameters and
/// optional overrides of the catalog's default target, test and source
/// trail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    identifier: Option<String>,
    params: Vec<(String, String)>,
    source_trail: Option<String>,
    target: Option<String>,
    test: Option<String>,
}

impl Message {
    /// A message with no identifier and no parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A message keyed by `identifier`.
    pub fn identified(identifier: impl Into<String>) -> Self {
        Self::new().identifier(identifier)
    }

    /// Set the per-occurrence identifier.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Append a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Scope the message to a provenance source trail.
    pub fn source_trail(mut self, trail: impl Into<String>) -> Self {
        self.source_trail = Some(trail.into());
        self
    }

    /// Scope the message to a source trail when one is known.
    pub fn maybe_source_trail(mut self, trail: Option<&str>) -> Self {
        self.source_trail = trail.map(str::to_string);
        self
    }

    /// Record under a target other than the catalog default.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Record under a test other than the catalog default.
    pub fn test(mut self, test: impl Into<String>) -> Self {
        self.test = Some(test.into());
        self
    }

    /// The identifier, if any.
    pub fn get_identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// The parameters, in insertion order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

// ─── Catalog ────────────────────────────────────────────────────────

/// Severity-partitioned store of validation messages.
///
/// A catalog is created per validation run (or sub-validation), mutated
/// only through [`report`](Self::report) and [`merge`](Self::merge), and
/// handed to the caller as a finished snapshot. It is not meant to be
/// shared between concurrent runs; give each run its own catalog and merge
/// afterward.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    registry: Arc<CodeRegistry>,
    default_target: String,
    default_test: String,
    messages: MessagesByTarget,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new(CodeRegistry::builtin())
    }
}

impl MessageCatalog {
    /// An empty catalog with the default target and test.
    pub fn new(registry: Arc<CodeRegistry>) -> Self {
        Self::with_defaults(registry, DEFAULT_TARGET, DEFAULT_TEST)
    }

    /// An empty catalog with the given default target and test.
    ///
    /// Empty names fall back to [`DEFAULT_TARGET`] and [`DEFAULT_TEST`].
    pub fn with_defaults(
        registry: Arc<CodeRegistry>,
        target: impl Into<String>,
        test: impl Into<String>,
    ) -> Self {
        let target = target.into();
        let test = test.into();
        Self {
            registry,
            default_target: if target.is_empty() { DEFAULT_TARGET.to_string() } else { target },
            default_test: if test.is_empty() { DEFAULT_TEST.to_string() } else { test },
            messages: MessagesByTarget::new(),
        }
    }

    /// An empty catalog sharing this catalog's registry and defaults.
    pub fn spawn(&self) -> Self {
        Self::with_defaults(
            Arc::clone(&self.registry),
            self.default_target.clone(),
            self.default_test.clone(),
        )
    }

    /// The code registry messages are checked against.
    pub fn registry(&self) -> &Arc<CodeRegistry> {
        &self.registry
    }

    /// Default target of reports that do not name one.
    pub fn default_target(&self) -> &str {
        &self.default_target
    }

    /// Default test of reports that do not name one.
    pub fn default_test(&self) -> &str {
        &self.default_test
    }

    /// Change the default target for subsequent reports.
    pub fn set_default_target(&mut self, target: impl Into<String>) {
        self.default_target = target.into();
    }

    /// Change the default test for subsequent reports.
    pub fn set_default_test(&mut self, test: impl Into<String>) {
        self.default_test = test.into();
    }

    /// Record one message.
    ///
    /// # Panics
    ///
    /// Panics if `code` is not registered. Codes are compiled into the
    /// validator, so an unknown code is a programmer error. Use
    /// [`try_report`](Self::try_report) to handle it instead.
    pub fn report(&mut self, code: &str, message: Message) {
        if let Err(e) = self.try_report(code, message) {
            panic!("MessageCatalog::report: {e}");
        }
    }

    /// Record one message, rejecting unknown codes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCode`] if `code` is not registered.
    pub fn try_report(&mut self, code: &str, message: Message) -> Result<(), CatalogError> {
        let severity = self
            .registry
            .lookup(code)
            .map(|entry| entry.severity)
            .ok_or_else(|| CatalogError::UnknownCode(code.to_string()))?;

        let Message {
            identifier,
            params,
            source_trail,
            target,
            test,
        } = message;

        let target = target.unwrap_or_else(|| self.default_target.clone());
        let test = test.unwrap_or_else(|| self.default_test.clone());
        let trail = source_trail.unwrap_or_else(|| DEFAULT_SOURCE_TRAIL.to_string());

        let scope = self
            .slot_mut(target, test)
            .get_mut(severity)
            .entry(code.to_string())
            .or_default()
            .entry(trail)
            .or_default();

        if let Some(identifier) = identifier {
            let entry = scope.entry(identifier).or_insert(Occurrences::Marker);
            if !params.is_empty() {
                let occurrence: Parameters = params.into_iter().collect();
                entry.absorb(&Occurrences::Listed(vec![occurrence]));
            }
        }
        Ok(())
    }

    fn slot_mut(&mut self, target: String, test: String) -> &mut SeverityPartitions {
        self.messages
            .entry(target)
            .or_default()
            .entry(test)
            .or_default()
    }

    /// Partitions of a `(test, target)` slot; `None` arguments use the defaults.
    pub fn slot(&self, test: Option<&str>, target: Option<&str>) -> Option<&SeverityPartitions> {
        self.messages
            .get(target.unwrap_or(&self.default_target))?
            .get(test.unwrap_or(&self.default_test))
    }

    /// Whether the default slot holds any message.
    pub fn has_messages(&self) -> bool {
        self.has_messages_in(None, None)
    }

    /// Whether a slot holds any message.
    pub fn has_messages_in(&self, test: Option<&str>, target: Option<&str>) -> bool {
        self.slot(test, target).is_some_and(|slot| !slot.is_empty())
    }

    /// Whether the default slot holds a message of `severity`.
    pub fn has_severity(&self, severity: Severity) -> bool {
        self.has_severity_in(severity, None, None)
    }

    /// Whether a slot holds a message of `severity`.
    pub fn has_severity_in(
        &self,
        severity: Severity,
        test: Option<&str>,
        target: Option<&str>,
    ) -> bool {
        self.slot(test, target)
            .is_some_and(|slot| !slot.get(severity).is_empty())
    }

    /// Whether the default slot holds an error or critical message.
    pub fn has_blocking(&self) -> bool {
        self.has_severity(Severity::Error) || self.has_severity(Severity::Critical)
    }

    /// Overall verdict of the default slot: no error and no critical messages.
    pub fn passed(&self) -> bool {
        !self.has_blocking()
    }

    /// Messages of one severity in the default slot.
    pub fn severity(&self, severity: Severity) -> Option<&CodedMessages> {
        self.slot(None, None).map(|slot| slot.get(severity))
    }

    /// Occurrences recorded for `identifier` under `code` (any source trail
    /// of the default slot), in source-trail order.
    pub fn occurrences(&self, code: &str, identifier: &str) -> Vec<&Occurrences> {
        let Some(severity) = Severity::of_code(code) else {
            return Vec::new();
        };
        self.severity(severity)
            .and_then(|coded| coded.get(code))
            .map(|scoped| scoped.values().filter_map(|ids| ids.get(identifier)).collect())
            .unwrap_or_default()
    }

    /// Whether `code` was reported in the default slot.
    pub fn contains_code(&self, code: &str) -> bool {
        Severity::of_code(code)
            .and_then(|s| self.severity(s))
            .is_some_and(|coded| coded.contains_key(code))
    }

    /// Number of distinct codes of `severity` in the default slot.
    pub fn count(&self, severity: Severity) -> usize {
        self.severity(severity).map_or(0, |coded| coded.len())
    }

    /// The whole nested message map.
    pub fn messages(&self) -> &MessagesByTarget {
        &self.messages
    }

    /// JSON text of one severity partition of the default slot.
    ///
    /// `flat` selects single-line output.
    pub fn dump_severity(&self, severity: Severity, flat: bool) -> Result<String, CatalogError> {
        let empty = CodedMessages::new();
        let coded = self.severity(severity).unwrap_or(&empty);
        to_text(coded, flat)
    }

    /// JSON text of all severity partitions of the default slot.
    pub fn dump_all(&self, flat: bool) -> Result<String, CatalogError> {
        let empty = SeverityPartitions::default();
        let slot = self.slot(None, None).unwrap_or(&empty);
        to_text(slot, flat)
    }

    /// Export the whole catalog as a JSON value.
    pub fn to_value(&self) -> Result<Value, CatalogError> {
        Ok(serde_json::to_value(&self.messages)?)
    }

    /// Rebuild a catalog from its exported form.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] if `value` does not have the
    /// catalog shape, and [`CatalogError::UnknownCode`] if it mentions a
    /// code the registry does not know, or files a code under the wrong
    /// severity.
    pub fn from_value(registry: Arc<CodeRegistry>, value: Value) -> Result<Self, CatalogError> {
        let messages: MessagesByTarget = serde_json::from_value(value)?;
        for slot in messages.values().flat_map(|tests| tests.values()) {
            for severity in Severity::all() {
                for code in slot.get(*severity).keys() {
                    let registered = registry.lookup(code).map(|e| e.severity);
                    if registered != Some(*severity) {
                        return Err(CatalogError::UnknownCode(code.clone()));
                    }
                }
            }
        }
        let mut catalog = Self::new(registry);
        catalog.messages = messages;
        Ok(catalog)
    }

    /// Union `other` into this catalog.
    ///
    /// Paths missing here are created. For an identifier present on both
    /// sides, parameter lists are concatenated (this catalog's first); a
    /// marker combined with a list becomes the list.
    pub fn merge(&mut self, other: &MessageCatalog) {
        for (target, tests) in &other.messages {
            for (test, theirs) in tests {
                let ours = self.slot_mut(target.clone(), test.clone());
                for severity in Severity::all() {
                    merge_coded(ours.get_mut(*severity), theirs.get(*severity));
                }
            }
        }
    }
}

fn merge_coded(ours: &mut CodedMessages, theirs: &CodedMessages) {
    for (code, scoped) in theirs {
        let our_scoped = ours.entry(code.clone()).or_default();
        for (trail, identified) in scoped {
            let our_identified = our_scoped.entry(trail.clone()).or_default();
            for (identifier, occurrences) in identified {
                match our_identified.get_mut(identifier) {
                    Some(existing) => existing.absorb(occurrences),
                    None => {
                        our_identified.insert(identifier.clone(), occurrences.clone());
                    }
                }
            }
        }
    }
}

fn to_text<T: Serialize>(value: &T, flat: bool) -> Result<String, CatalogError> {
    let text = if flat {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> MessageCatalog {
        MessageCatalog::default()
    }

    const EMPTY_KG: &str = "warning.trapi.response.message.knowledge_graph.empty";
    const STATUS: &str = "warning.trapi.response.status.unknown";
    const IMPRECISE: &str = "warning.trapi.response.message.knowledge_graph.node.category.imprecise";

    #[test]
    fn new_catalog_is_empty_and_passes() {
        let c = catalog();
        assert!(!c.has_messages());
        assert!(c.passed());
        assert_eq!(c.default_target(), "global");
        assert_eq!(c.default_test(), "test");
    }

    #[test]
    fn empty_default_names_fall_back() {
        let c = MessageCatalog::with_defaults(CodeRegistry::builtin(), "", "");
        assert_eq!(c.default_target(), DEFAULT_TARGET);
        assert_eq!(c.default_test(), DEFAULT_TEST);
    }

    #[test]
    fn touching_a_slot_creates_all_severities() {
        let mut c = catalog();
        c.report(EMPTY_KG, Message::new());
        let exported = c.to_value().unwrap();
        let slot = &exported["global"]["test"];
        for key in ["info", "skipped", "warning", "error", "critical"] {
            assert!(slot.get(key).is_some(), "missing partition {key}");
        }
        assert_eq!(slot["warning"][EMPTY_KG], json!({"global": {}}));
    }

    #[test]
    fn repeated_bare_identifier_is_one_marker() {
        let mut c = catalog();
        c.report(STATUS, Message::identified("Weird"));
        c.report(STATUS, Message::identified("Weird"));
        let occ = c.occurrences(STATUS, "Weird");
        assert_eq!(occ, vec![&Occurrences::Marker]);
        let ids = &c.severity(Severity::Warning).unwrap()[STATUS]["global"];
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn parameterized_reports_accumulate_in_order() {
        let mut c = catalog();
        c.report(IMPRECISE, Message::identified("x").param("expected_category", "a"));
        c.report(IMPRECISE, Message::identified("x").param("expected_category", "b"));
        let occ = c.occurrences(IMPRECISE, "x");
        let values: Vec<_> = occ[0]
            .parameters()
            .iter()
            .map(|p| p["expected_category"].as_str())
            .collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn marker_upgrades_to_list_but_list_never_downgrades() {
        let mut c = catalog();
        c.report(IMPRECISE, Message::identified("x"));
        c.report(IMPRECISE, Message::identified("x").param("expected_category", "a"));
        c.report(IMPRECISE, Message::identified("x"));
        let occ = c.occurrences(IMPRECISE, "x");
        assert_eq!(occ[0].parameters().len(), 1);
    }

    #[test]
    fn source_trail_scopes_messages() {
        let mut c = catalog();
        c.report(STATUS, Message::identified("a").source_trail("infores:x -> infores:y"));
        c.report(STATUS, Message::identified("a"));
        let scoped = &c.severity(Severity::Warning).unwrap()[STATUS];
        let trails: Vec<_> = scoped.keys().map(String::as_str).collect();
        assert_eq!(trails, vec!["infores:x -> infores:y", "global"]);
    }

    #[test]
    fn reports_route_to_named_target_and_test() {
        let mut c = catalog();
        c.report(
            "error.trapi.response.empty",
            Message::new().target("ara-1").test("case-3"),
        );
        assert!(!c.has_messages());
        assert!(c.has_messages_in(Some("case-3"), Some("ara-1")));
        assert!(c.has_severity_in(Severity::Error, Some("case-3"), Some("ara-1")));
        assert!(c.passed());
    }

    #[test]
    fn unknown_code_is_rejected() {
        let mut c = catalog();
        let err = c.try_report("error.made.up", Message::new()).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCode(ref code) if code == "error.made.up"));
        assert!(!c.has_messages());
    }

    #[test]
    #[should_panic(expected = "unknown message code")]
    fn report_panics_on_unknown_code() {
        catalog().report("warning.made.up", Message::new());
    }

    #[test]
    fn verdict_fails_on_error_or_critical_only() {
        let mut c = catalog();
        c.report(STATUS, Message::identified("x"));
        assert!(c.passed());
        c.report("critical.trapi.validation", Message::identified("1.4.0"));
        assert!(!c.passed());
        assert!(c.has_severity(Severity::Critical));
        assert!(!c.has_severity(Severity::Error));
    }

    #[test]
    fn merge_concatenates_receiver_first() {
        let mut a = catalog();
        a.report(IMPRECISE, Message::identified("x").param("expected_category", "a"));
        let mut b = catalog();
        b.report(IMPRECISE, Message::identified("x").param("expected_category", "b"));

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);

        let order = |c: &MessageCatalog| -> Vec<String> {
            c.occurrences(IMPRECISE, "x")[0]
                .parameters()
                .iter()
                .map(|p| p["expected_category"].clone())
                .collect()
        };
        assert_eq!(order(&ab), vec!["a", "b"]);
        assert_eq!(order(&ba), vec!["b", "a"]);
    }

    #[test]
    fn merge_marker_with_list_yields_list() {
        let mut a = catalog();
        a.report(IMPRECISE, Message::identified("x"));
        let mut b = catalog();
        b.report(IMPRECISE, Message::identified("x").param("expected_category", "b"));
        a.merge(&b);
        assert_eq!(a.occurrences(IMPRECISE, "x")[0].parameters().len(), 1);

        let mut c = catalog();
        c.report(IMPRECISE, Message::identified("x").param("expected_category", "c"));
        let mut marker = catalog();
        marker.report(IMPRECISE, Message::identified("x"));
        c.merge(&marker);
        assert_eq!(c.occurrences(IMPRECISE, "x")[0].parameters().len(), 1);
    }

    #[test]
    fn merge_creates_missing_slots() {
        let mut a = catalog();
        let mut b = catalog();
        b.report("error.trapi.response.empty", Message::new().target("t2"));
        a.merge(&b);
        assert!(a.has_severity_in(Severity::Error, None, Some("t2")));
    }

    #[test]
    fn dump_severity_is_ordered_json() {
        let mut c = catalog();
        c.report(STATUS, Message::identified("B"));
        c.report(EMPTY_KG, Message::new());
        let text = c.dump_severity(Severity::Warning, true).unwrap();
        assert_eq!(
            text,
            format!(r#"{{"{STATUS}":{{"global":{{"B":null}}}},"{EMPTY_KG}":{{"global":{{}}}}}}"#)
        );
    }

    #[test]
    fn dump_all_of_untouched_catalog_has_empty_partitions() {
        let text = catalog().dump_all(true).unwrap();
        assert_eq!(
            text,
            r#"{"info":{},"skipped":{},"warning":{},"error":{},"critical":{}}"#
        );
    }

    #[test]
    fn export_and_import_preserve_content() {
        let mut c = catalog();
        c.report(IMPRECISE, Message::identified("x").param("expected_category", "a"));
        c.report(STATUS, Message::identified("Odd"));
        let value = c.to_value().unwrap();
        let back = MessageCatalog::from_value(CodeRegistry::builtin(), value.clone()).unwrap();
        assert_eq!(back.to_value().unwrap(), value);
    }

    #[test]
    fn import_rejects_misfiled_code() {
        let value = json!({"global": {"test": {"error": {STATUS: {"global": {}}}}}});
        let err = MessageCatalog::from_value(CodeRegistry::builtin(), value).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCode(_)));
    }

    #[test]
    fn spawn_shares_defaults_but_not_messages() {
        let mut c = MessageCatalog::with_defaults(CodeRegistry::builtin(), "ara", "case");
        c.report(STATUS, Message::identified("x"));
        let child = c.spawn();
        assert!(!child.has_messages());
        assert_eq!(child.default_target(), "ara");
        assert_eq!(child.default_test(), "case");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const CODES: &[&str] = &[
        "warning.trapi.response.status.unknown",
        "error.trapi.response.message.knowledge_graph.node.missing",
        "info.trapi.response.schema_version.override",
    ];

    /// (code index, identifier, optional parameter value)
    fn reports(prefix: &'static str) -> impl Strategy<Value = Vec<(usize, String, Option<String>)>> {
        prop::collection::vec(
            (
                0..CODES.len(),
                "[a-c]".prop_map(move |s| format!("{prefix}{s}")),
                prop::option::of("[a-z]{1,4}"),
            ),
            0..12,
        )
    }

    fn build(ops: &[(usize, String, Option<String>)]) -> MessageCatalog {
        let mut c = MessageCatalog::default();
        for (code, id, value) in ops {
            let mut message = Message::identified(id.clone());
            if let Some(v) = value {
                message = message.param("context", v.clone());
            }
            c.report(CODES[*code], message);
        }
        c
    }

    fn merged(a: &MessageCatalog, b: &MessageCatalog) -> MessageCatalog {
        let mut out = a.clone();
        out.merge(b);
        out
    }

    proptest! {
        /// Repeating a bare report never changes the catalog.
        #[test]
        fn bare_reports_are_idempotent(ops in reports("id-")) {
            let once = build(&ops);
            let mut twice = once.clone();
            for (code, id, _) in &ops {
                twice.report(CODES[*code], Message::identified(id.clone()));
            }
            prop_assert_eq!(once.messages(), twice.messages());
        }

        /// Merging catalogs with disjoint identifiers is commutative.
        #[test]
        fn merge_commutes_over_disjoint_keys(a in reports("a-"), b in reports("b-")) {
            let (a, b) = (build(&a), build(&b));
            let (ab, ba) = (merged(&a, &b), merged(&b, &a));
            prop_assert_eq!(ab.messages(), ba.messages());
        }

        /// Merging is associative, overlapping identifiers included.
        #[test]
        fn merge_is_associative(a in reports(""), b in reports(""), c in reports("")) {
            let (a, b, c) = (build(&a), build(&b), build(&c));
            let left = merged(&merged(&a, &b), &c);
            let right = merged(&a, &merged(&b, &c));
            prop_assert_eq!(left.to_value().unwrap(), right.to_value().unwrap());
        }

        /// Merging two catalogs equals reporting both op sequences into one.
        #[test]
        fn merge_matches_sequential_reporting(a in reports(""), b in reports("")) {
            let combined: Vec<_> = a.iter().chain(b.iter()).cloned().collect();
            let sequential = build(&combined);
            let by_merge = merged(&build(&a), &build(&b));
            prop_assert_eq!(
                sequential.dump_all(true).unwrap().len(),
                by_merge.dump_all(true).unwrap().len()
            );
            prop_assert_eq!(sequential.messages(), by_merge.messages());
        }
    }
}
