//! # Response Validation CLI
//!
//! `trapi-validate response <FILE>` runs the validation pipeline over one
//! TRAPI response document and prints the report.
//!
//! ```bash
//! # Validate against the latest release known to the built-in snapshot:
//! trapi-validate response reply.json
//!
//! # Pin a release, cap the sampled knowledge graph, print JSON:
//! trapi-validate response reply.json --trapi-version 1.4 --max-kg-edges 500 --json
//!
//! # Validate against a local schema document and check test case edges:
//! trapi-validate response reply.json --schema ./TranslatorReasonerAPI.yaml \
//!     --test-cases cases.yaml --ontology biolink.yaml --aliases aliases.yaml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};
use trapi_core::RenderOptions;
use trapi_schema::{FetchConfig, SchemaFetcher, SchemaLibrary, VersionResolver};
use trapi_validator::{
    ResponseValidator, StaticAliases, StaticOntology, TestCase, ValidationReport, ValidatorConfig,
};

use crate::{resolver_from_file, EXIT_FAILED, EXIT_PASSED};

/// Arguments of `trapi-validate response`.
#[derive(Args, Debug)]
pub struct ResponseArgs {
    /// TRAPI response document (JSON).
    pub file: PathBuf,

    /// Validator configuration file (YAML or JSON). Flags override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// TRAPI version reference: release, shorthand ("1", "1.4") or branch.
    #[arg(long)]
    pub trapi_version: Option<String>,

    /// Local TRAPI schema document to validate against.
    #[arg(long, conflicts_with = "trapi_version")]
    pub schema: Option<PathBuf>,

    /// Release list file (YAML or JSON list of tags). Defaults to the
    /// built-in release snapshot.
    #[arg(long)]
    pub releases: Option<PathBuf>,

    /// Knowledge graph edges to validate (0 = all).
    #[arg(long)]
    pub max_kg_edges: Option<usize>,

    /// Results to validate (0 = all).
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Do not report missing or empty message parts.
    #[arg(long)]
    pub suppress_empty_data_warnings: bool,

    /// Test cases (YAML or JSON list) the response must witness.
    #[arg(long)]
    pub test_cases: Option<PathBuf>,

    /// Ontology file enabling category and predicate checks.
    #[arg(long)]
    pub ontology: Option<PathBuf>,

    /// Alias groups file used when matching test cases.
    #[arg(long)]
    pub aliases: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Omit blank lines and underlining from the text report.
    #[arg(long)]
    pub compact: bool,

    /// Identifiers printed per code (0 = all).
    #[arg(long, default_value_t = 0)]
    pub id_rows: usize,

    /// Parameter rows printed per identifier (0 = all).
    #[arg(long, default_value_t = 0)]
    pub msg_rows: usize,
}

impl ResponseArgs {
    /// Configuration file contents with command-line overrides applied.
    pub fn validator_config(&self) -> Result<ValidatorConfig> {
        let mut config = match &self.config {
            Some(path) => ValidatorConfig::from_file(path)?,
            None => ValidatorConfig::default(),
        };
        if let Some(schema) = &self.schema {
            config.trapi_version = Some(schema.display().to_string());
        } else if let Some(version) = &self.trapi_version {
            config.trapi_version = Some(version.clone());
        }
        if let Some(edges) = self.max_kg_edges {
            config.max_kg_edges = edges;
        }
        if let Some(results) = self.max_results {
            config.max_results = results;
        }
        if self.suppress_empty_data_warnings {
            config.suppress_empty_data_warnings = true;
        }
        Ok(config)
    }
}

/// Execute `trapi-validate response`.
pub fn run_response(args: &ResponseArgs) -> Result<u8> {
    let response = read_response(&args.file)?;
    let validator = build_validator(args)?;

    let report = match &args.test_cases {
        Some(path) => {
            let cases = TestCase::list_from_file(path)?;
            tracing::info!(cases = cases.len(), "matching test cases");
            validator.validate_with_test_cases(&response, &cases)
        }
        None => validator.validate(&response),
    };

    if args.json {
        let document = report_json(&report)?;
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        let options = RenderOptions {
            title: Some(format!("Validation Report for '{}'", args.file.display())),
            id_rows: args.id_rows,
            msg_rows: args.msg_rows,
            compact: args.compact,
            trapi_version: report.trapi_version.as_ref().map(ToString::to_string),
        };
        print!("{}", report.catalog.render(&options));
        for (case, witnessed) in &report.witnessed {
            println!("{} {case}", if *witnessed { "WITNESSED" } else { "MISSING  " });
        }
    }

    Ok(if report.passed() { EXIT_PASSED } else { EXIT_FAILED })
}

fn read_response(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read response: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse response JSON: {}", path.display()))
}

fn build_validator(args: &ResponseArgs) -> Result<ResponseValidator> {
    let config = args.validator_config()?;
    let resolver = match &args.releases {
        Some(path) => resolver_from_file(path)?,
        None => VersionResolver::builtin(),
    };

    let fetch_config = FetchConfig::from_env().context("invalid schema fetch configuration")?;
    let fetcher = SchemaFetcher::new(fetch_config).context("failed to build schema fetcher")?;

    let mut validator =
        ResponseValidator::new(config, resolver, Arc::new(SchemaLibrary::new(fetcher)));
    if let Some(path) = &args.ontology {
        validator = validator.with_ontology(Arc::new(StaticOntology::from_file(path)?));
    }
    if let Some(path) = &args.aliases {
        validator = validator.with_aliases(Arc::new(StaticAliases::from_file(path)?));
    }
    tracing::debug!(validator = ?validator, "validator ready");
    Ok(validator)
}

/// JSON form of a report: verdict, versions, test case outcomes and the
/// exported catalog.
pub fn report_json(report: &ValidationReport) -> Result<Value> {
    let witnessed: Vec<Value> = report
        .witnessed
        .iter()
        .map(|(case, witnessed)| json!({ "case": case, "witnessed": witnessed }))
        .collect();
    Ok(json!({
        "passed": report.passed(),
        "trapi_version": report.trapi_version.as_ref().map(ToString::to_string),
        "biolink_version": report.biolink_version,
        "reached": report.reached.to_string(),
        "halted_at": report.halted_at.map(|s| s.to_string()),
        "witnessed": witnessed,
        "messages": report.catalog.to_value()?,
    }))
}
