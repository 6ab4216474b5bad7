//! # trapi-validate CLI entry point
//!
//! Parses command-line arguments, initializes logging and dispatches to
//! the subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trapi_cli::codes::{run_codes, CodesArgs};
use trapi_cli::resolve::{run_resolve, ResolveArgs};
use trapi_cli::response::{run_response, ResponseArgs};
use trapi_cli::EXIT_ERROR;

/// TRAPI response validator.
///
/// Validates Translator Reasoner API responses against a TRAPI release,
/// checks graph compliance and test case edges, and resolves TRAPI
/// version references.
#[derive(Parser, Debug)]
#[command(name = "trapi-validate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a TRAPI response document.
    Response(ResponseArgs),

    /// Resolve a TRAPI version reference.
    Resolve(ResolveArgs),

    /// List the registered validation codes.
    Codes(CodesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "trapi-validate starting");

    let result = match &cli.command {
        Commands::Response(args) => run_response(args),
        Commands::Resolve(args) => run_resolve(args),
        Commands::Codes(args) => run_codes(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use trapi_core::Severity;

    #[test]
    fn cli_parse_response() {
        let cli = Cli::try_parse_from(["trapi-validate", "response", "reply.json", "--json"]).unwrap();
        if let Commands::Response(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("reply.json"));
            assert!(args.json);
            assert!(!args.compact);
            assert!(args.trapi_version.is_none());
        } else {
            panic!("expected response command");
        }
    }

    #[test]
    fn cli_parse_response_with_all_options() {
        let cli = Cli::try_parse_from([
            "trapi-validate",
            "response",
            "reply.json",
            "--trapi-version",
            "1.4",
            "--releases",
            "releases.yaml",
            "--max-kg-edges",
            "100",
            "--max-results",
            "5",
            "--test-cases",
            "cases.yaml",
            "--ontology",
            "biolink.yaml",
            "--compact",
            "--id-rows",
            "3",
            "--msg-rows",
            "2",
        ])
        .unwrap();
        if let Commands::Response(args) = cli.command {
            assert_eq!(args.trapi_version.as_deref(), Some("1.4"));
            assert_eq!(args.releases, Some(PathBuf::from("releases.yaml")));
            assert_eq!(args.max_kg_edges, Some(100));
            assert_eq!(args.max_results, Some(5));
            assert_eq!(args.test_cases, Some(PathBuf::from("cases.yaml")));
            assert_eq!(args.ontology, Some(PathBuf::from("biolink.yaml")));
            assert!(args.compact);
            assert_eq!((args.id_rows, args.msg_rows), (3, 2));
        } else {
            panic!("expected response command");
        }
    }

    #[test]
    fn cli_parse_resolve() {
        let cli = Cli::try_parse_from(["trapi-validate", "resolve", "1.3", "--offline"]).unwrap();
        if let Commands::Resolve(args) = cli.command {
            assert_eq!(args.key, "1.3");
            assert!(args.offline);
        } else {
            panic!("expected resolve command");
        }
    }

    #[test]
    fn cli_parse_codes_severity() {
        let cli = Cli::try_parse_from(["trapi-validate", "codes", "--severity", "warning"]).unwrap();
        if let Commands::Codes(args) = cli.command {
            assert_eq!(args.severity, Some(Severity::Warning));
        } else {
            panic!("expected codes command");
        }
        assert!(Cli::try_parse_from(["trapi-validate", "codes", "--severity", "fatal"]).is_err());
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli0 = Cli::try_parse_from(["trapi-validate", "codes"]).unwrap();
        assert_eq!(cli0.verbose, 0);

        let cli2 = Cli::try_parse_from(["trapi-validate", "-vv", "codes"]).unwrap();
        assert_eq!(cli2.verbose, 2);

        let cli3 = Cli::try_parse_from(["trapi-validate", "codes", "-vvv", "--log-json"]).unwrap();
        assert_eq!(cli3.verbose, 3);
        assert!(cli3.log_json);
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["trapi-validate"]).is_err());
    }
}
