//! Line Classification
//!
//! Every line of a changelog is either a comment, a rollback directive or a
//! statement. Only statement lines are subject to structural checks.

use std::sync::LazyLock;

use regex::Regex;

/// Prefix of rollback directives
pub const ROLLBACK_PREFIX: &str = "--rollback";

/// Header every formatted SQL changelog is expected to carry
pub const FORMATTED_SQL_HEADER: &str = "--liquibase formatted sql";

static INLINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--.*$").expect("inline comment pattern"));

/// Kind of a changelog line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `--`, `/*` or `*` comment line (markers included)
    Comment,
    /// `--rollback` directive
    Rollback,
    /// Anything else, blank lines included
    Statement,
}

/// Classify a single line
pub fn classify_line(line: &str) -> LineKind {
    if is_rollback_line(line) {
        LineKind::Rollback
    } else if is_comment_line(line) {
        LineKind::Comment
    } else {
        LineKind::Statement
    }
}

pub fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("--") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

pub fn is_rollback_line(line: &str) -> bool {
    line.trim().starts_with(ROLLBACK_PREFIX)
}

/// Drop a trailing `--` comment, if any.
///
/// This is textual: a `--` inside a string literal also starts a comment.
pub fn strip_inline_comment(line: &str) -> std::borrow::Cow<'_, str> {
    INLINE_COMMENT.replace(line, "")
}
