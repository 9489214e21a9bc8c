//! Validation Report
//!
//! Diagnostics rebased to absolute file lines, with per-severity counts and
//! the fixed-width text rendering consumed by migration tooling.

use std::fmt;

use serde::Serialize;

use crate::parser::{ChangesetKey, Segment};
use crate::validation::{Check, Severity, ValidationResult};

const RULE_WIDTH: usize = 55;

/// One report line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// Absolute line in the script (1-based)
    pub line: usize,
    pub severity: Severity,
    pub check: Check,
    pub message: String,
}

/// Per-severity counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReportSummary {
    pub critical: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Outcome of validating one changeset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub changeset: ChangesetKey,
    pub start_line: usize,
    pub summary: ReportSummary,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Build a report from sorted diagnostics
    pub fn new(segment: &Segment<'_>, result: &ValidationResult) -> Self {
        let mut summary = ReportSummary::default();
        let entries = result
            .diagnostics
            .iter()
            .map(|diagnostic| {
                match diagnostic.severity {
                    Severity::Critical => summary.critical += 1,
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                }
                ReportEntry {
                    line: segment.absolute_line(diagnostic.line),
                    severity: diagnostic.severity,
                    check: diagnostic.check,
                    message: diagnostic.message.clone(),
                }
            })
            .collect();

        Self {
            changeset: segment.key.clone(),
            start_line: segment.start_line,
            summary,
            entries,
        }
    }

    /// A single diagnostic of any severity fails the changeset
    pub fn fired(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.fired() {
            return write!(f, "✓ Validated: {}", self.changeset);
        }

        let rule = "-".repeat(RULE_WIDTH);
        writeln!(f)?;
        writeln!(f, "VALIDATION FAILED: {}", self.changeset)?;
        writeln!(
            f,
            "Critical: {} | Errors: {} | Warnings: {}",
            self.summary.critical, self.summary.errors, self.summary.warnings
        )?;
        writeln!(f, "{}", rule)?;
        for entry in &self.entries {
            writeln!(
                f,
                "[{}] Line {}: {}",
                entry.severity.tag(),
                entry.line,
                entry.message
            )?;
        }
        writeln!(f, "{}", rule)
    }
}
