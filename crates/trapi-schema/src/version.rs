//! # Version Resolution
//!
//! Parses TRAPI release versions, orders them, and resolves a raw version
//! reference to the artifact that schema loading should use.
//!
//! ## Grammar
//!
//! ```text
//! [v]major(.minor(.patch)?)?(-prerelease)?(+buildmetadata)?
//! ```
//!
//! A [`PartialVersion`] (minor or patch omitted) is only meaningful as a
//! lookup key. Ordering is defined on complete [`SemVer`]s only.
//!
//! ## Ordering
//!
//! Major, minor and patch compare numerically. When they are equal, a
//! version carrying a prerelease tag is lower than the same version
//! without one. Two different prerelease tags on the same numeric
//! version compare [`Ordering::Equal`]: prerelease identifiers are not
//! compared field by field. `1.4.0-beta2` is therefore neither above nor
//! below `1.4.0-beta4`, and [`PartialOrd`] returns `None` for that pair.
//!
//! ## Shorthand Table
//!
//! [`VersionResolver`] is built once from the list of published releases.
//! Besides the exact release strings it registers three shorthand keys:
//!
//! ```text
//! "M"      -> latest minor of major M (at its latest patch)
//! "M.m"    -> latest patch of M.m
//! "M.m.p"  -> M.m.p itself, or its latest prerelease when M.m.p itself
//!             was never published
//! ```
//!
//! A shorthand is registered only if the release it points to is itself
//! in the published list.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// Snapshot of published TRAPI releases, for use when the release list
/// cannot be fetched.
pub const KNOWN_TRAPI_RELEASES: &[&str] = &[
    "1.0.0",
    "1.1.0",
    "1.2.0",
    "1.3.0",
    "1.4.0-beta",
    "1.4.0-beta2",
    "1.4.0-beta3",
    "1.4.0-beta4",
    "1.4.0",
    "1.4.1",
    "1.4.2",
];

/// Non-versioned schema branches known without fetching.
pub const KNOWN_TRAPI_BRANCHES: &[&str] = &["master"];

const SEMVER_PATTERN: &str = concat!(
    r"^v?(?P<major>0|[1-9]\d*)(?:\.(?P<minor>0|[1-9]\d*)(?:\.(?P<patch>0|[1-9]\d*))?)?",
    r"(?:-(?P<prerelease>(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
    r"(?:\+(?P<buildmetadata>[0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
);

fn semver_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SEMVER_PATTERN).expect("release version pattern is valid"))
}

/// First TRAPI release whose results carry edge bindings inside analyses
/// and whose edges carry retrieval `sources`.
pub fn trapi_1_4_0_beta() -> SemVer {
    SemVer::new(1, 4, 0).with_prerelease("beta")
}

/// First TRAPI release affected by the `auxiliary_graphs` schema patch.
pub fn trapi_1_4_0_beta3() -> SemVer {
    SemVer::new(1, 4, 0).with_prerelease("beta3")
}

/// TRAPI 1.4.0.
pub fn trapi_1_4_0() -> SemVer {
    SemVer::new(1, 4, 0)
}

// ─── PartialVersion ─────────────────────────────────────────────────

/// A version reference whose minor and patch may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialVersion {
    /// Major version.
    pub major: u64,
    /// Minor version, if given.
    pub minor: Option<u64>,
    /// Patch version, if given.
    pub patch: Option<u64>,
    /// Prerelease tag, without the leading `-`.
    pub prerelease: Option<String>,
    /// Build metadata, without the leading `+`.
    pub buildmetadata: Option<String>,
}

impl PartialVersion {
    /// Parse a full or partial version string.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidVersion`] on grammar mismatch.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersion(s.to_string());
        let caps = semver_pattern().captures(s.trim()).ok_or_else(invalid)?;

        let number = |name: &str| -> Result<Option<u64>, VersionError> {
            caps.name(name)
                .map(|m| m.as_str().parse::<u64>())
                .transpose()
                .map_err(|_| invalid())
        };
        let text = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

        Ok(Self {
            major: number("major")?.ok_or_else(invalid)?,
            minor: number("minor")?,
            patch: number("patch")?,
            prerelease: text("prerelease"),
            buildmetadata: text("buildmetadata"),
        })
    }

    /// Whether minor and patch are both present.
    pub fn is_complete(&self) -> bool {
        self.minor.is_some() && self.patch.is_some()
    }
}

impl fmt::Display for PartialVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
        }
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.buildmetadata {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

// ─── SemVer ─────────────────────────────────────────────────────────

/// A complete release version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemVer {
    /// Major version.
    pub major: u64,
    /// Minor version.
    pub minor: u64,
    /// Patch version.
    pub patch: u64,
    /// Prerelease tag, without the leading `-`.
    pub prerelease: Option<String>,
    /// Build metadata, without the leading `+`.
    pub buildmetadata: Option<String>,
}

impl SemVer {
    /// A plain `major.minor.patch` release.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            buildmetadata: None,
        }
    }

    /// The same numeric release, tagged as a prerelease.
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// Parse a complete version string.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidVersion`] on grammar mismatch and
    /// [`VersionError::UnderspecifiedVersion`] when minor or patch is missing.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        PartialVersion::parse(s)?.try_into()
    }

    /// Release precedence. See the module documentation for the
    /// prerelease rule.
    pub fn compare(&self, other: &SemVer) -> Ordering {
        self.triple()
            .cmp(&other.triple())
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                _ => Ordering::Equal,
            })
    }

    /// `self >= floor` under [`compare`](Self::compare).
    pub fn is_at_least(&self, floor: &SemVer) -> bool {
        self.compare(floor) != Ordering::Less
    }

    /// Whether this is a prerelease.
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl TryFrom<PartialVersion> for SemVer {
    type Error = VersionError;

    fn try_from(v: PartialVersion) -> Result<Self, Self::Error> {
        match (v.minor, v.patch) {
            (Some(minor), Some(patch)) => Ok(Self {
                major: v.major,
                minor,
                patch,
                prerelease: v.prerelease,
                buildmetadata: v.buildmetadata,
            }),
            _ => Err(VersionError::UnderspecifiedVersion(v.to_string())),
        }
    }
}

impl TryFrom<String> for SemVer {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<SemVer> for String {
    fn from(v: SemVer) -> Self {
        v.to_string()
    }
}

impl FromStr for SemVer {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.buildmetadata {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl PartialOrd for SemVer {
    /// Consistent with `Eq`: versions that [`compare`](SemVer::compare)
    /// equal but differ in prerelease or build metadata are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.compare(other) {
            Ordering::Equal if self != other => None,
            ordering => Some(ordering),
        }
    }
}

// ─── VersionSelector ────────────────────────────────────────────────

/// What a resolved version reference points at.
///
/// Ordering is only defined for [`Released`](Self::Released); callers
/// gating behavior on version must decide explicitly what a branch or a
/// local schema file means for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSelector {
    /// A published release.
    Released(SemVer),
    /// A non-versioned branch of the schema repository.
    Branch(String),
    /// A local schema document.
    FilePath(PathBuf),
}

impl VersionSelector {
    /// The release, when this selects one.
    pub fn release(&self) -> Option<&SemVer> {
        match self {
            Self::Released(v) => Some(v),
            _ => None,
        }
    }

    /// Git reference of the schema document: `v<release>` or the branch
    /// name. Local files have none.
    pub fn git_ref(&self) -> Option<String> {
        match self {
            Self::Released(v) => Some(format!("v{v}")),
            Self::Branch(name) => Some(name.clone()),
            Self::FilePath(_) => None,
        }
    }

    /// `Some(release >= floor)` for releases; `None` for branches and files.
    pub fn is_at_least(&self, floor: &SemVer) -> Option<bool> {
        self.release().map(|v| v.is_at_least(floor))
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Released(v) => write!(f, "{v}"),
            Self::Branch(name) => f.write_str(name),
            Self::FilePath(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Whether a version reference names a local schema document.
pub fn is_schema_file(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    [".yaml", ".yml", ".json"].iter().any(|ext| lower.ends_with(ext))
}

fn strip_tag_prefix(key: &str) -> &str {
    match key.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => key,
    }
}

// ─── VersionResolver ────────────────────────────────────────────────

/// Read-only lookup table from version references to selectors.
///
/// Built once from a release list (fetched, or [`KNOWN_TRAPI_RELEASES`])
/// and a branch list; never mutated afterward. Independent resolvers can
/// coexist, e.g. a fixture universe in tests next to the live one.
#[derive(Debug, Clone, Default)]
pub struct VersionResolver {
    releases: Vec<SemVer>,
    table: IndexMap<String, SemVer>,
    branches: Vec<String>,
}

impl VersionResolver {
    /// Build the resolver. Release tags may carry a leading `v`. Strings
    /// that do not parse as complete versions are skipped with a warning.
    pub fn new<R, B>(releases: R, branches: B) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        let mut parsed = Vec::new();
        for raw in releases {
            let raw = strip_tag_prefix(raw.as_ref().trim());
            match SemVer::parse(raw) {
                Ok(v) => parsed.push(v),
                Err(e) => tracing::warn!(release = raw, error = %e, "ignoring unusable release tag"),
            }
        }
        let table = build_table(&parsed);
        tracing::debug!(
            releases = parsed.len(),
            keys = table.len(),
            "built TRAPI version table"
        );
        Self {
            releases: parsed,
            table,
            branches: branches.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolver over the built-in release snapshot.
    pub fn builtin() -> Self {
        Self::new(KNOWN_TRAPI_RELEASES, KNOWN_TRAPI_BRANCHES.iter().copied())
    }

    /// Resolve a version reference.
    ///
    /// Schema file paths (`.yaml`, `.yml`, `.json`) pass through as
    /// [`VersionSelector::FilePath`]. Exact releases and shorthand keys
    /// (an optional leading `v` is accepted) give
    /// [`VersionSelector::Released`]. Known branch names give
    /// [`VersionSelector::Branch`].
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::UnresolvedVersion`] for anything else.
    pub fn resolve(&self, key: &str) -> Result<VersionSelector, VersionError> {
        let key = key.trim();
        if is_schema_file(key) {
            return Ok(VersionSelector::FilePath(PathBuf::from(key)));
        }
        if let Some(release) = self.table.get(strip_tag_prefix(key)) {
            return Ok(VersionSelector::Released(release.clone()));
        }
        if self.branches.iter().any(|b| b == key) {
            return Ok(VersionSelector::Branch(key.to_string()));
        }
        Err(VersionError::UnresolvedVersion(key.to_string()))
    }

    /// Resolve a version reference, falling back to [`latest`](Self::latest)
    /// when it does not resolve. The fallback is logged.
    ///
    /// # Errors
    ///
    /// Returns the resolution error only when no release is known at all.
    pub fn resolve_or_latest(&self, key: &str) -> Result<VersionSelector, VersionError> {
        match self.resolve(key) {
            Ok(selector) => Ok(selector),
            Err(e) => match self.latest() {
                Some(latest) => {
                    tracing::warn!(
                        requested = key,
                        resolved = %latest,
                        "unresolved TRAPI version; using latest known release"
                    );
                    Ok(VersionSelector::Released(latest.clone()))
                }
                None => Err(e),
            },
        }
    }

    /// Highest known release. Among releases that compare equal, the one
    /// listed last wins.
    pub fn latest(&self) -> Option<&SemVer> {
        self.releases.iter().fold(None, |best, candidate| match best {
            Some(b) if candidate.compare(b) == Ordering::Less => Some(b),
            _ => Some(candidate),
        })
    }

    /// Known releases, in the order supplied.
    pub fn releases(&self) -> &[SemVer] {
        &self.releases
    }

    /// Known branches.
    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// Every lookup key with the release it resolves to.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &SemVer)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v))
    }
}

type Triple = (u64, u64, u64);

fn build_table(releases: &[SemVer]) -> IndexMap<String, SemVer> {
    let known: HashSet<String> = releases.iter().map(ToString::to_string).collect();
    let mut table: IndexMap<String, SemVer> = IndexMap::new();

    let mut plain: BTreeSet<Triple> = BTreeSet::new();
    let mut latest_prerelease: BTreeMap<Triple, &SemVer> = BTreeMap::new();
    let mut latest_patch: BTreeMap<(u64, u64), u64> = BTreeMap::new();
    let mut latest_minor: BTreeMap<u64, u64> = BTreeMap::new();

    for release in releases {
        table.insert(release.to_string(), release.clone());
        let triple = release.triple();
        if release.is_prerelease() {
            latest_prerelease.insert(triple, release);
        } else {
            plain.insert(triple);
        }
        let patch = latest_patch.entry((release.major, release.minor)).or_insert(release.patch);
        *patch = (*patch).max(release.patch);
        let minor = latest_minor.entry(release.major).or_insert(release.minor);
        *minor = (*minor).max(release.minor);
    }

    let candidate = |t: Triple| -> Option<SemVer> {
        if plain.contains(&t) {
            Some(SemVer::new(t.0, t.1, t.2))
        } else {
            latest_prerelease.get(&t).map(|v| (*v).clone())
        }
    };
    let mut register = |key: String, candidate: Option<SemVer>| {
        if let Some(release) = candidate {
            if known.contains(&release.to_string()) {
                table.entry(key).or_insert(release);
            }
        }
    };

    let triples: BTreeSet<Triple> = plain.iter().chain(latest_prerelease.keys()).copied().collect();
    for (major, minor, patch) in triples {
        register(format!("{major}.{minor}.{patch}"), candidate((major, minor, patch)));
    }
    for (&(major, minor), &patch) in &latest_patch {
        register(format!("{major}.{minor}"), candidate((major, minor, patch)));
    }
    for (&major, &minor) in &latest_minor {
        if let Some(&patch) = latest_patch.get(&(major, minor)) {
            register(format!("{major}"), candidate((major, minor, patch)));
        }
    }

    table
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn semver() -> impl Strategy<Value = SemVer> {
        (0u64..3, 0u64..3, 0u64..3, prop::option::of("(alpha|beta|rc)[0-9]?")).prop_map(
            |(major, minor, patch, pre)| {
                let v = SemVer::new(major, minor, patch);
                match pre {
                    Some(p) => v.with_prerelease(p),
                    None => v,
                }
            },
        )
    }

    proptest! {
        /// compare is antisymmetric.
        #[test]
        fn compare_is_antisymmetric(a in semver(), b in semver()) {
            prop_assert_eq!(a.compare(&b), b.compare(&a).reverse());
        }

        /// compare is transitive.
        #[test]
        fn compare_is_transitive(a in semver(), b in semver(), c in semver()) {
            if a.compare(&b) != Ordering::Greater && b.compare(&c) != Ordering::Greater {
                prop_assert_ne!(a.compare(&c), Ordering::Greater);
            }
        }

        /// Display output parses back to the same version.
        #[test]
        fn display_parses_back(a in semver()) {
            prop_assert_eq!(SemVer::parse(&a.to_string()).unwrap(), a);
        }

        /// Every table key resolves to a release that is in the input list.
        #[test]
        fn shorthand_targets_are_published(list in prop::collection::vec(semver(), 0..10)) {
            let strings: Vec<String> = list.iter().map(ToString::to_string).collect();
            let r = VersionResolver::new(&strings, Vec::<String>::new());
            for (_, release) in r.keys() {
                prop_assert!(strings.contains(&release.to_string()));
            }
        }
    }
}
