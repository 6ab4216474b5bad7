//! # Version Resolution CLI
//!
//! `trapi-validate resolve <KEY>` prints what a TRAPI version reference
//! resolves to, and where its schema document lives.
//!
//! The release universe comes from `--releases <FILE>`, from the built-in
//! snapshot with `--offline`, or otherwise from the GitHub release list of
//! the schema repository (`GIT_ORGANIZATION` / `GIT_REPOSITORY`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use trapi_schema::{FetchConfig, SchemaFetcher, VersionResolver, VersionSelector};

use crate::{resolver_from_file, EXIT_FAILED, EXIT_PASSED};

/// Arguments of `trapi-validate resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Version reference: release, shorthand, branch or schema file.
    pub key: String,

    /// Release list file (YAML or JSON list of tags).
    #[arg(long, conflicts_with = "offline")]
    pub releases: Option<PathBuf>,

    /// Use the built-in release snapshot instead of querying GitHub.
    #[arg(long)]
    pub offline: bool,

    /// Fall back to the latest release when the key does not resolve.
    #[arg(long)]
    pub latest: bool,

    /// Also list every shorthand key of the release universe.
    #[arg(long)]
    pub table: bool,
}

/// Execute `trapi-validate resolve`.
pub fn run_resolve(args: &ResolveArgs) -> Result<u8> {
    let fetcher = SchemaFetcher::new(FetchConfig::from_env()?).context("failed to build schema fetcher")?;
    let resolver = match (&args.releases, args.offline) {
        (Some(path), _) => resolver_from_file(path)?,
        (None, true) => VersionResolver::builtin(),
        (None, false) => fetcher
            .resolver()
            .context("failed to fetch the TRAPI release list")?,
    };

    if args.table {
        for (key, release) in resolver.keys() {
            println!("{key:<16} -> {release}");
        }
        println!();
    }

    let resolved = if args.latest {
        resolver.resolve_or_latest(&args.key)
    } else {
        resolver.resolve(&args.key)
    };

    match resolved {
        Ok(selector) => {
            println!("{}", describe(&selector));
            if let Some(url) = fetcher.schema_url(&selector)? {
                println!("  schema: {url}");
            }
            Ok(EXIT_PASSED)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(EXIT_FAILED)
        }
    }
}

/// One-line description of a resolved selector.
pub fn describe(selector: &VersionSelector) -> String {
    match selector {
        VersionSelector::Released(v) => format!("release {v}"),
        VersionSelector::Branch(name) => format!("branch {name}"),
        VersionSelector::FilePath(path) => format!("schema file {}", path.display()),
    }
}
