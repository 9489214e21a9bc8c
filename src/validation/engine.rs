//! Validation Engine
//!
//! Runs the check battery over one changeset segment and turns the collected
//! diagnostics into a report.

use serde::Serialize;

use crate::parser::Segment;
use crate::report::Report;
use crate::validation::rules;

/// Severity of a diagnostic. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
        }
    }

    /// Four-letter tag used in the text report
    pub fn tag(&self) -> &'static str {
        &self.as_str()[..4]
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which check produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    MissingHeader,
    CreateTypo,
    AlterTypo,
    KeywordTypo,
    UnmatchedParentheses,
    UnmatchedQuotes,
    MissingComma,
    MissingSemicolon,
    UnterminatedBlock,
    DanglingIf,
    DoubleSemicolon,
    ReservedWordColumn,
}

impl Check {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::CreateTypo => "create_typo",
            Self::AlterTypo => "alter_typo",
            Self::KeywordTypo => "keyword_typo",
            Self::UnmatchedParentheses => "unmatched_parentheses",
            Self::UnmatchedQuotes => "unmatched_quotes",
            Self::MissingComma => "missing_comma",
            Self::MissingSemicolon => "missing_semicolon",
            Self::UnterminatedBlock => "unterminated_block",
            Self::DanglingIf => "dangling_if",
            Self::DoubleSemicolon => "double_semicolon",
            Self::ReservedWordColumn => "reserved_word_column",
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic for one segment line
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based offset within the segment; the marker line is 1
    pub line: usize,
    pub message: String,
    pub severity: Severity,
    pub check: Check,
}

/// Diagnostics collected during one evaluation pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, line: usize, check: Check, severity: Severity, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            line,
            message: message.into(),
            severity,
            check,
        });
    }

    pub fn add_error(&mut self, line: usize, check: Check, message: impl Into<String>) {
        self.add(line, check, Severity::Error, message);
    }

    pub fn add_warning(&mut self, line: usize, check: Check, message: impl Into<String>) {
        self.add(line, check, Severity::Warning, message);
    }

    /// Any diagnostic, whatever its severity, fails the changeset
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Order by line, then severity. Stable, so check order breaks ties.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by_key(|d| (d.line, d.severity));
    }
}

/// A check reads the segment and records what it finds
pub type CheckFn = fn(&Segment<'_>, &mut ValidationResult);

/// The battery, in evaluation order
pub const CHECKS: &[CheckFn] = &[
    rules::check_header,
    rules::check_typos,
    rules::check_parentheses,
    rules::check_quotes,
    rules::check_missing_comma,
    rules::check_missing_semicolon,
    rules::check_blocks,
    rules::check_dangling_if,
    rules::check_double_semicolon,
    rules::check_reserved_words,
];

/// Run every check over a segment, sorted but not yet reported
pub fn validate_segment(segment: &Segment<'_>) -> ValidationResult {
    let mut result = ValidationResult::new();
    for check in CHECKS {
        check(segment, &mut result);
    }
    result.sort();
    log::debug!(
        "changeset {} produced {} diagnostic(s)",
        segment.key,
        result.diagnostics.len()
    );
    result
}

/// Validate a segment and build its report
pub fn evaluate(segment: &Segment<'_>) -> Report {
    let result = validate_segment(segment);
    Report::new(segment, &result)
}
