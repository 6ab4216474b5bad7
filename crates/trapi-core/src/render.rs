//! # Report Rendering
//!
//! Human-readable text dump of a [`MessageCatalog`], grouped
//!
//! ```text
//! slot -> severity -> code (with template) -> source trail -> identifier -> parameters
//! ```
//!
//! in catalog insertion order. Identifiers per code and source trail and
//! parameter rows per identifier can be capped; each cap that cuts something off emits
//! an "N more ..." notice.

use std::fmt;

use crate::catalog::{IdentifiedMessages, MessageCatalog, Occurrences, SeverityPartitions};
use crate::severity::Severity;

const UNDERLINE_ON: &str = "\x1b[4m";
const UNDERLINE_OFF: &str = "\x1b[0m";

/// Layout options for [`MessageCatalog::render`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Report title. `Some("")` generates `Validation Report for '<target>'`;
    /// `None` suppresses the title line.
    pub title: Option<String>,
    /// Maximum identifiers printed per code; 0 prints all.
    pub id_rows: usize,
    /// Maximum parameter rows printed per identifier; 0 prints all.
    pub msg_rows: usize,
    /// Omit blank spacer lines and ANSI underlining.
    pub compact: bool,
    /// Protocol version the catalog was produced against, for the header.
    pub trapi_version: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: Some(String::new()),
            id_rows: 0,
            msg_rows: 0,
            compact: false,
            trapi_version: None,
        }
    }
}

/// A catalog paired with render options; format it with `Display`.
pub struct Rendered<'a> {
    catalog: &'a MessageCatalog,
    options: &'a RenderOptions,
}

impl MessageCatalog {
    /// Render the catalog as human-readable text.
    ///
    /// ```
    /// use trapi_core::{Message, MessageCatalog, RenderOptions};
    ///
    /// let mut catalog = MessageCatalog::default();
    /// catalog.report("error.trapi.response.empty", Message::new());
    /// let text = catalog.render(&RenderOptions::default()).to_string();
    /// assert!(text.contains("* error.trapi.response.empty:"));
    /// ```
    pub fn render<'a>(&'a self, options: &'a RenderOptions) -> Rendered<'a> {
        Rendered { catalog: self, options }
    }
}

impl Rendered<'_> {
    fn header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opts = self.options;
        if let Some(title) = &opts.title {
            let title = if title.is_empty() {
                format!("Validation Report for '{}'", self.catalog.default_target())
            } else {
                title.clone()
            };
            if opts.compact {
                writeln!(f, "{title}")?;
            } else {
                writeln!(f)?;
                writeln!(f)?;
                writeln!(f, "{UNDERLINE_ON}{title}{UNDERLINE_OFF}")?;
            }
        }
        if !opts.compact {
            writeln!(f)?;
        }
        write!(f, "TRAPI Validator version '{}'", env!("CARGO_PKG_VERSION"))?;
        if let Some(version) = &opts.trapi_version {
            write!(f, " validating against TRAPI version '{version}'")?;
        }
        writeln!(f, ".")?;
        writeln!(f)
    }

    fn slot(&self, f: &mut fmt::Formatter<'_>, slot: &SeverityPartitions) -> fmt::Result {
        let compact = self.options.compact;
        for severity in Severity::all() {
            let coded = slot.get(*severity);
            if coded.is_empty() {
                continue;
            }
            if compact {
                writeln!(f)?;
                writeln!(f, "{}:", severity.heading())?;
            } else {
                writeln!(f, "{UNDERLINE_ON}{}{UNDERLINE_OFF}", severity.heading())?;
                writeln!(f)?;
            }

            for (code, scoped) in coded {
                let template = self.catalog.registry().template(code).unwrap_or_default();
                writeln!(f, "* {code}:")?;
                writeln!(f, "=> {template}")?;
                if !compact {
                    writeln!(f)?;
                }
                for (trail, identified) in scoped {
                    writeln!(f, "\t$ {trail}")?;
                    self.identifiers(f, code, identified)?;
                    if !compact {
                        writeln!(f)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Renders the identifiers of one source trail under `code`; the
    /// `id_rows` cap restarts for every trail.
    fn identifiers(
        &self,
        f: &mut fmt::Formatter<'_>,
        code: &str,
        identified: &IdentifiedMessages,
    ) -> fmt::Result {
        let opts = self.options;
        let more_ids = identified.len().saturating_sub(opts.id_rows);

        for (shown, (identifier, occurrences)) in identified.iter().enumerate() {
            match occurrences {
                Occurrences::Marker => {
                    writeln!(f, "\t\t# {identifier}")?;
                }
                Occurrences::Listed(rows) => {
                    writeln!(f, "\t\t# {identifier}:")?;
                    if let Some(first) = rows.first() {
                        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
                        writeln!(f, "\t\t- {}: ", keys.join(" | "))?;
                    }
                    let more_msgs = rows.len().saturating_sub(opts.msg_rows);
                    for (printed, row) in rows.iter().enumerate() {
                        let values: Vec<&str> = row.values().map(String::as_str).collect();
                        writeln!(f, "\t\t\t{}", values.join(" | "))?;
                        if opts.msg_rows > 0 && printed + 1 >= opts.msg_rows {
                            if more_msgs > 0 {
                                writeln!(
                                    f,
                                    "\t\t{more_msgs} more messages for identifier '{identifier}'..."
                                )?;
                            }
                            break;
                        }
                    }
                }
            }
            if !opts.compact {
                writeln!(f)?;
            }
            if opts.id_rows > 0 && shown + 1 >= opts.id_rows {
                if more_ids > 0 {
                    writeln!(f, "{more_ids} more identifiers for code '{code}'...")?;
                }
                break;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.header(f)?;

        let slots: Vec<(&String, &String, &SeverityPartitions)> = self
            .catalog
            .messages()
            .iter()
            .flat_map(|(target, tests)| {
                tests
                    .iter()
                    .filter(|(_, slot)| !slot.is_empty())
                    .map(move |(test, slot)| (target, test, slot))
            })
            .collect();

        if slots.is_empty() {
            return writeln!(f, "Hurray! No validation messages reported!");
        }

        let labelled = slots.len() > 1
            || slots.iter().any(|(target, test, _)| {
                target.as_str() != self.catalog.default_target()
                    || test.as_str() != self.catalog.default_test()
            });

        for (target, test, slot) in slots {
            if labelled {
                writeln!(f, "Target '{target}', test '{test}':")?;
            }
            self.slot(f, slot)?;
        }
        Ok(())
    }
}
