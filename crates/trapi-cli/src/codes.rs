//! # Code Listing CLI
//!
//! `trapi-validate codes` lists the registered validation message codes
//! with their templates, or the full Markdown dictionary.

use anyhow::Result;
use clap::Args;
use trapi_core::{CodeRegistry, Severity};

use crate::EXIT_PASSED;

/// Arguments of `trapi-validate codes`.
#[derive(Args, Debug)]
pub struct CodesArgs {
    /// Only list codes of this severity (info, skipped, warning, error, critical).
    #[arg(long)]
    pub severity: Option<Severity>,

    /// Print the Markdown code dictionary, with descriptions.
    #[arg(long, conflicts_with = "severity")]
    pub markdown: bool,
}

/// Execute `trapi-validate codes`.
pub fn run_codes(args: &CodesArgs) -> Result<u8> {
    let registry = CodeRegistry::builtin();
    if args.markdown {
        print!("{}", registry.markdown());
        return Ok(EXIT_PASSED);
    }
    for line in listing(&registry, args.severity) {
        println!("{line}");
    }
    Ok(EXIT_PASSED)
}

/// `code: template` lines, in registry order.
pub fn listing(registry: &CodeRegistry, severity: Option<Severity>) -> Vec<String> {
    registry
        .iter()
        .filter(|entry| severity.map_or(true, |s| entry.severity == s))
        .map(|entry| format!("{}: {}", entry.code, entry.template))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_code() {
        let registry = CodeRegistry::builtin();
        assert_eq!(listing(&registry, None).len(), registry.len());
    }

    #[test]
    fn filters_by_severity() {
        let registry = CodeRegistry::builtin();
        let critical = listing(&registry, Some(Severity::Critical));
        assert_eq!(critical.len(), 2);
        assert!(critical.iter().all(|line| line.starts_with("critical.")));
    }
}
