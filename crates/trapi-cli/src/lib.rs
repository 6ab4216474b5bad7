//! # trapi-cli — TRAPI Response Validator CLI
//!
//! Provides the `trapi-validate` command-line interface.
//!
//! ## Subcommands
//!
//! - `trapi-validate response` — Validate a TRAPI response document,
//!   optionally checking it against test case edges.
//! - `trapi-validate resolve` — Resolve a version reference to a release,
//!   branch or schema file.
//! - `trapi-validate codes` — List the registered validation codes.
//!
//! ```bash
//! trapi-validate response reply.json --trapi-version 1.4 --max-kg-edges 500
//! trapi-validate response reply.json --schema ./TranslatorReasonerAPI.yaml --json
//! trapi-validate resolve 1.3 --releases releases.yaml
//! trapi-validate codes --markdown
//! ```
//!
//! Exit codes: 0 when validation passed, 1 when it did not, 2 when the
//! command could not run.

pub mod codes;
pub mod resolve;
pub mod response;

use std::path::Path;

use anyhow::{Context, Result};
use trapi_schema::{VersionResolver, KNOWN_TRAPI_BRANCHES};

/// Exit code of a passed validation.
pub const EXIT_PASSED: u8 = 0;
/// Exit code of a failed validation.
pub const EXIT_FAILED: u8 = 1;
/// Exit code of a command that could not run.
pub const EXIT_ERROR: u8 = 2;

/// Build a resolver from a release list file: a YAML (or JSON) list of
/// release tags, such as `["v1.3.0", "v1.4.0-beta", "v1.4.0"]`.
pub fn resolver_from_file(path: &Path) -> Result<VersionResolver> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read release list: {}", path.display()))?;
    let releases: Vec<String> = serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse release list: {}", path.display()))?;
    tracing::debug!(releases = releases.len(), path = %path.display(), "loaded release list");
    Ok(VersionResolver::new(releases, KNOWN_TRAPI_BRANCHES.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_from_release_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releases.yaml");
        std::fs::write(&path, "- v1.3.0\n- v1.4.0-beta\n- v1.4.0\n").unwrap();
        let resolver = resolver_from_file(&path).unwrap();
        assert_eq!(resolver.resolve("1").unwrap().to_string(), "1.4.0");
        assert_eq!(resolver.resolve("master").unwrap().to_string(), "master");
    }

    #[test]
    fn resolver_from_missing_file_fails() {
        let err = resolver_from_file(Path::new("/nonexistent/releases.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read release list"));
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_PASSED, EXIT_FAILED);
        assert_ne!(EXIT_FAILED, EXIT_ERROR);
    }
}
