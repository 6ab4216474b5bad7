//! # Severity
//!
//! The five message severities. The first segment of every message code
//! names one of them.
//!
//! Only `error` and `critical` are blocking: they fail the overall
//! verdict, and they stop the validation pipeline from advancing past
//! a gated stage. `critical` additionally halts the pipeline outright.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Severity of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Diagnostic information.
    Info,
    /// A check that was intentionally not performed.
    Skipped,
    /// Suspicious but non-fatal.
    Warning,
    /// Semantic or structural non-conformance; fails the verdict.
    Error,
    /// Protocol-breaking; fails the verdict and halts the pipeline.
    Critical,
}

impl Severity {
    /// All severities, in catalog order.
    pub fn all() -> &'static [Severity] {
        &[
            Self::Info,
            Self::Skipped,
            Self::Warning,
            Self::Error,
            Self::Critical,
        ]
    }

    /// Lower-case name, as used in message codes and exported catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Skipped => "skipped",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Capitalized heading used in rendered reports.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Skipped => "Skipped",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Critical => "Critical",
        }
    }

    /// Whether messages of this severity fail the verdict.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Error | Self::Critical)
    }

    /// Severity named by the first segment of a dotted message code.
    pub fn of_code(code: &str) -> Option<Severity> {
        code.split('.').next().and_then(|head| head.parse().ok())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "skipped" => Ok(Self::Skipped),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(RegistryError::UnknownSeverity(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_roundtrips_through_from_str() {
        for s in Severity::all() {
            assert_eq!(s.to_string().parse::<Severity>().unwrap(), *s);
        }
    }

    #[test]
    fn only_error_and_critical_block() {
        let blocking: Vec<_> = Severity::all().iter().filter(|s| s.is_blocking()).collect();
        assert_eq!(blocking, vec![&Severity::Error, &Severity::Critical]);
    }

    #[test]
    fn severity_of_code_uses_first_segment() {
        assert_eq!(
            Severity::of_code("warning.trapi.response.status.unknown"),
            Some(Severity::Warning)
        );
        assert_eq!(Severity::of_code("critical.trapi.validation"), Some(Severity::Critical));
        assert_eq!(Severity::of_code("fatal.something"), None);
        assert_eq!(Severity::of_code(""), None);
    }

    #[test]
    fn serde_uses_lower_case() {
        let json = serde_json::to_string(&Severity::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
    }
}
