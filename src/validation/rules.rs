//! Structural Checks
//!
//! Each check scans the raw lines of one segment and records diagnostics
//! against 1-based segment offsets. Checks are keyword and token heuristics
//! over single lines or short lookahead windows, not a SQL grammar, so they
//! can misfire on unusual multi-line statements.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::line::{
    is_rollback_line, strip_inline_comment, LineKind, FORMATTED_SQL_HEADER,
};
use crate::parser::{classify_line, Segment};
use crate::validation::catalog::TYPO_CATALOG;
use crate::validation::engine::{Check, Severity, ValidationResult};

/// Lines searched for the formatted SQL header
pub const HEADER_WINDOW: usize = 5;
/// Lines searched after a statement for its terminating semicolon
pub const SEMICOLON_LOOKAHEAD: usize = 30;
/// Lines searched after `BEGIN` for `END;`
pub const BLOCK_LOOKAHEAD: usize = 100;

const DATATYPES: &str =
    "TEXT|VARCHAR|VARCHAR2|CHAR|INT|INTEGER|BIGINT|BIGSERIAL|NUMBER|DATE|TIMESTAMP|TIMESTAMPTZ|CLOB|BLOB";

const RESERVED_WORDS: &[&str] = &["USER", "LEVEL", "SIZE", "ORDER", "GROUP", "DATE", "NUMBER"];

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in check pattern")
}

static MISSING_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    regex(&format!(
        r"\b[A-Z_][A-Z0-9_]*\s+({DATATYPES})\s+[A-Z_][A-Z0-9_]*\s+({DATATYPES})"
    ))
});

static STATEMENT_START: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)^(CREATE|ALTER|DROP|INSERT|UPDATE|DELETE|GRANT|REVOKE)\b")
});

static LOOKAHEAD_STOP: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)^(CREATE|ALTER|DROP|INSERT|UPDATE|DELETE|--)"));

static BEGIN: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\bBEGIN\b"));
static END: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\bEND\s*;"));

static IF: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\bIF\b"));
static IF_NOT_EXISTS: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)\bIF\b.*\bNOT\b.*\bEXISTS\b"));
static IF_EXISTS: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\bIF\s+EXISTS\b"));
static THEN: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\bTHEN\b"));

static RESERVED_COLUMN: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    RESERVED_WORDS
        .iter()
        .map(|word| {
            (
                *word,
                regex(&format!(r"\b{word}\s+(TEXT|VARCHAR|INT|NOT\s+NULL)")),
            )
        })
        .collect()
});

/// Statement lines of a segment with their 1-based offsets
fn statement_lines<'a>(segment: &'a Segment<'_>) -> impl Iterator<Item = (usize, &'a str)> {
    segment
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| classify_line(line) == LineKind::Statement)
        .map(|(idx, line)| (idx + 1, line.as_str()))
}

/// The first changeset of a file must be preceded by the formatted SQL
/// header. Only applies when the segment starts on line 1.
pub fn check_header(segment: &Segment<'_>, result: &mut ValidationResult) {
    if segment.start_line != 1 {
        return;
    }
    let found = segment
        .lines
        .iter()
        .take(HEADER_WINDOW)
        .any(|line| line.to_lowercase().contains(FORMATTED_SQL_HEADER));
    if !found {
        result.add(
            1,
            Check::MissingHeader,
            Severity::Critical,
            format!("Missing '{}' header", FORMATTED_SQL_HEADER),
        );
    }
}

pub fn check_typos(segment: &Segment<'_>, result: &mut ValidationResult) {
    for typo in TYPO_CATALOG.iter() {
        for (offset, line) in statement_lines(segment) {
            if typo.regex.is_match(line) {
                result.add(offset, typo.check, typo.entry.severity, typo.entry.message);
            }
        }
    }
}

/// Parentheses are balanced across the whole segment, not per line
pub fn check_parentheses(segment: &Segment<'_>, result: &mut ValidationResult) {
    let cleaned: Vec<(usize, String)> = statement_lines(segment)
        .map(|(offset, line)| (offset, strip_inline_comment(line).into_owned()))
        .collect();

    let total_open: usize = cleaned.iter().map(|(_, l)| l.matches('(').count()).sum();
    let total_close: usize = cleaned.iter().map(|(_, l)| l.matches(')').count()).sum();
    if total_open == total_close {
        return;
    }

    let mut open = 0;
    let mut close = 0;
    let first_excess_close = cleaned.iter().find_map(|(offset, line)| {
        open += line.matches('(').count();
        close += line.matches(')').count();
        (close > open).then_some(*offset)
    });

    let problem_line = first_excess_close
        .or_else(|| cleaned.last().map(|(offset, _)| *offset))
        .unwrap_or(segment.lines.len());

    result.add_error(
        problem_line,
        Check::UnmatchedParentheses,
        format!(
            "Unmatched parentheses: {} '(' vs {} ')'",
            total_open, total_close
        ),
    );
}

pub fn check_quotes(segment: &Segment<'_>, result: &mut ValidationResult) {
    for (offset, line) in statement_lines(segment) {
        if strip_inline_comment(line).matches('\'').count() % 2 != 0 {
            result.add_error(offset, Check::UnmatchedQuotes, "Unmatched single quotes");
        }
    }
}

/// `name TEXT email TEXT`: two column definitions on one line, no comma
pub fn check_missing_comma(segment: &Segment<'_>, result: &mut ValidationResult) {
    for (offset, line) in statement_lines(segment) {
        if MISSING_COMMA.is_match(&line.to_uppercase()) {
            result.add_error(
                offset,
                Check::MissingComma,
                "Missing comma between column definitions",
            );
        }
    }
}

/// A statement must reach a line ending in `;` before the next statement,
/// comment or marker. The line right after the statement never ends the
/// search, so a comment directly below a statement is tolerated.
pub fn check_missing_semicolon(segment: &Segment<'_>, result: &mut ValidationResult) {
    let lines = segment.lines;
    for (offset, line) in statement_lines(segment) {
        if !STATEMENT_START.is_match(line.trim()) {
            continue;
        }

        let idx = offset - 1;
        let window_end = (idx + SEMICOLON_LOOKAHEAD + 1).min(lines.len());
        let mut terminated = false;
        for (j, candidate) in lines.iter().enumerate().take(window_end).skip(idx) {
            if is_rollback_line(candidate) {
                continue;
            }
            let trimmed = candidate.trim();
            if trimmed.ends_with(';') {
                terminated = true;
                break;
            }
            if j > idx + 1 && LOOKAHEAD_STOP.is_match(trimmed) {
                break;
            }
        }

        if !terminated {
            result.add_warning(
                offset,
                Check::MissingSemicolon,
                "Statement missing terminating semicolon",
            );
        }
    }
}

/// `BEGIN` must be closed by `END;` within the following lines
pub fn check_blocks(segment: &Segment<'_>, result: &mut ValidationResult) {
    let lines = segment.lines;
    for (offset, line) in statement_lines(segment) {
        if !BEGIN.is_match(line) {
            continue;
        }
        let closed = lines
            .iter()
            .skip(offset)
            .take(BLOCK_LOOKAHEAD)
            .filter(|candidate| !is_rollback_line(candidate))
            .any(|candidate| END.is_match(candidate));
        if !closed {
            result.add_error(offset, Check::UnterminatedBlock, "BEGIN without matching END");
        }
    }
}

/// Procedural `IF` needs a `THEN` on its line or one of the next two.
/// `IF EXISTS` and `IF NOT EXISTS` guards are exempt.
pub fn check_dangling_if(segment: &Segment<'_>, result: &mut ValidationResult) {
    let lines = segment.lines;
    for (offset, line) in statement_lines(segment) {
        if IF_NOT_EXISTS.is_match(line) || IF_EXISTS.is_match(line) || !IF.is_match(line) {
            continue;
        }
        let has_then = lines
            .iter()
            .skip(offset - 1)
            .take(3)
            .any(|candidate| THEN.is_match(candidate));
        if !has_then {
            result.add_error(offset, Check::DanglingIf, "IF without THEN");
        }
    }
}

pub fn check_double_semicolon(segment: &Segment<'_>, result: &mut ValidationResult) {
    for (offset, line) in statement_lines(segment) {
        if line.contains(";;") {
            result.add_warning(offset, Check::DoubleSemicolon, "Double semicolon (;;)");
        }
    }
}

pub fn check_reserved_words(segment: &Segment<'_>, result: &mut ValidationResult) {
    for (offset, line) in statement_lines(segment) {
        let upper = line.to_uppercase();
        for (word, pattern) in RESERVED_COLUMN.iter() {
            if pattern.is_match(&upper) {
                result.add_warning(
                    offset,
                    Check::ReservedWordColumn,
                    format!("Reserved word '{}' as column name - use quotes", word),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{split_lines, ChangesetKey};

    fn run(check: fn(&Segment<'_>, &mut ValidationResult), lines: &[String]) -> ValidationResult {
        run_at(check, lines, 2)
    }

    fn run_at(
        check: fn(&Segment<'_>, &mut ValidationResult),
        lines: &[String],
        start_line: usize,
    ) -> ValidationResult {
        let segment = Segment {
            key: ChangesetKey::new("t", "1"),
            start_line,
            end_line: start_line + lines.len() - 1,
            lines,
        };
        let mut result = ValidationResult::new();
        check(&segment, &mut result);
        result
    }

    fn offsets(result: &ValidationResult) -> Vec<usize> {
        result.diagnostics.iter().map(|d| d.line).collect()
    }

    #[test]
    fn test_header_only_checked_on_first_line() {
        let lines = split_lines("--changeset a:1\nSELECT 1;");
        let result = run_at(check_header, &lines, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Critical);
        assert_eq!(result.diagnostics[0].line, 1);

        assert!(run_at(check_header, &lines, 2).is_valid());

        let with_header = split_lines("--changeset a:1\n--Liquibase Formatted SQL\nSELECT 1;");
        assert!(run_at(check_header, &with_header, 1).is_valid());
    }

    #[test]
    fn test_typos_skip_comments_and_rollbacks() {
        let lines = split_lines("--changeset a:1\n-- CREAT TABLE in a comment\nALTR TABLE t ADD x INT;\n--rollback SELCT 1;");
        let result = run(check_typos, &lines);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].message, "'ALTR' should be 'ALTER'");
        assert_eq!(result.diagnostics[0].check, Check::AlterTypo);
        assert_eq!(result.diagnostics[0].line, 3);
    }

    #[test]
    fn test_typo_catalog_entries() {
        let lines = split_lines("--changeset a:1\nINSRT INTO t VALUES (1);\nselct * from tabel;");
        let result = run(check_typos, &lines);
        let messages: Vec<&str> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "'TABEL' should be 'TABLE'",
                "'INSRT' should be 'INSERT'",
                "'SELCT' should be 'SELECT'",
            ]
        );
    }

    #[test]
    fn test_parentheses_ignore_comments() {
        let lines = split_lines("--changeset a:1\nf(x)) -- (\n-- ((((\n--rollback (");
        let result = run(check_parentheses, &lines);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics[0].message,
            "Unmatched parentheses: 1 '(' vs 2 ')'"
        );
        assert_eq!(result.diagnostics[0].line, 2);
    }

    #[test]
    fn test_unclosed_parenthesis_reported_on_last_statement() {
        let lines = split_lines("--changeset a:1\nCREATE TABLE t (\n  id INT\n;\n-- trailing comment");
        let result = run(check_parentheses, &lines);
        assert_eq!(offsets(&result), vec![4]);
    }

    #[test]
    fn test_balanced_parentheses_across_lines() {
        let lines = split_lines("--changeset a:1\nCREATE TABLE t (\n  id INT\n);");
        assert!(run(check_parentheses, &lines).is_valid());
    }

    #[test]
    fn test_quotes_per_line() {
        let lines = split_lines("--changeset a:1\nINSERT INTO t VALUES ('a', 'b);\nSELECT 'ok'; -- it's fine");
        let result = run(check_quotes, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_missing_comma() {
        let lines = split_lines("--changeset a:1\n  name TEXT email TEXT,\n  id BIGINT,\n  created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP");
        let result = run(check_missing_comma, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_semicolon_found_within_window() {
        let lines = split_lines("--changeset a:1\nINSERT INTO t (id)\nVALUES (1);");
        assert!(run(check_missing_semicolon, &lines).is_valid());
    }

    #[test]
    fn test_semicolon_missing() {
        let lines = split_lines("--changeset a:1\nINSERT INTO t (id)\nVALUES (1)");
        let result = run(check_missing_semicolon, &lines);
        assert_eq!(offsets(&result), vec![2]);
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_semicolon_search_stops_at_next_statement() {
        let lines = split_lines("--changeset a:1\nUPDATE t SET a = 1\nWHERE b = 2\nDELETE FROM t\nWHERE c = 3;");
        let result = run(check_missing_semicolon, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_semicolon_search_stops_at_comment() {
        let lines = split_lines("--changeset a:1\nUPDATE t SET a = 1\nWHERE b = 2\n-- next\nSELECT 1;");
        let result = run(check_missing_semicolon, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_comment_directly_below_statement_is_tolerated() {
        let lines = split_lines("--changeset a:1\nCREATE TABLE t (\n-- key\n  id INT);");
        assert!(run(check_missing_semicolon, &lines).is_valid());
    }

    #[test]
    fn test_semicolon_search_skips_rollback() {
        let lines = split_lines("--changeset a:1\nDROP TABLE t\n--rollback CREATE TABLE t (id INT);");
        let result = run(check_missing_semicolon, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_column_named_like_a_keyword_ends_search() {
        // `created_at` starts with CREATE, so the search stops before `);`
        let lines = split_lines("--changeset a:1\nCREATE TABLE t (\n  id INT,\n  created_at TIMESTAMP\n);");
        let result = run(check_missing_semicolon, &lines);
        assert_eq!(offsets(&result), vec![2]);

        let lines = split_lines("--changeset a:1\nCREATE TABLE t (\n  id INT,\n  registered_at TIMESTAMP\n);");
        assert!(run(check_missing_semicolon, &lines).is_valid());
    }

    /// Marker, a statement on segment line 2, `filler` lines, then `last`
    fn padded(statement: &str, filler: &str, count: usize, last: &str) -> Vec<String> {
        let mut text = format!("--changeset a:1\n{statement}\n");
        for _ in 0..count {
            text.push_str(filler);
            text.push('\n');
        }
        text.push_str(last);
        split_lines(&text)
    }

    #[test]
    fn test_semicolon_window_is_bounded() {
        // `;` on the last line of the window
        let lines = padded("CREATE TABLE t (", "  x INT,", SEMICOLON_LOOKAHEAD - 1, ");");
        assert!(run(check_missing_semicolon, &lines).is_valid());

        // one line past it
        let lines = padded("CREATE TABLE t (", "  x INT,", SEMICOLON_LOOKAHEAD, ");");
        let result = run(check_missing_semicolon, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_block_window_is_bounded() {
        let lines = padded("BEGIN", "  PERFORM 1;", BLOCK_LOOKAHEAD - 1, "END;");
        assert!(run(check_blocks, &lines).is_valid());

        let lines = padded("BEGIN", "  PERFORM 1;", BLOCK_LOOKAHEAD, "END;");
        let result = run(check_blocks, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_header_window_is_bounded() {
        let mut text = String::from("--changeset a:1\n");
        for _ in 1..HEADER_WINDOW - 1 {
            text.push('\n');
        }
        text.push_str("--liquibase formatted sql\nSELECT 1;");
        let lines = split_lines(&text);
        assert_eq!(lines[HEADER_WINDOW - 1], FORMATTED_SQL_HEADER);
        assert!(run_at(check_header, &lines, 1).is_valid());

        let mut text = String::from("--changeset a:1\n");
        for _ in 1..HEADER_WINDOW {
            text.push('\n');
        }
        text.push_str("--liquibase formatted sql\nSELECT 1;");
        let lines = split_lines(&text);
        assert_eq!(lines[HEADER_WINDOW], FORMATTED_SQL_HEADER);
        let result = run_at(check_header, &lines, 1);
        assert_eq!(offsets(&result), vec![1]);
    }

    #[test]
    fn test_complete_block() {
        let lines = split_lines("--changeset a:1\nDO $$\nBEGIN\n  PERFORM 1;\nEND;\n$$;");
        assert!(run(check_blocks, &lines).is_valid());
    }

    #[test]
    fn test_unterminated_block() {
        let lines = split_lines("--changeset a:1\nBEGIN\n  PERFORM 1;\n--rollback END;");
        let result = run(check_blocks, &lines);
        assert_eq!(offsets(&result), vec![2]);
        assert_eq!(result.diagnostics[0].message, "BEGIN without matching END");
    }

    #[test]
    fn test_dangling_if() {
        let lines = split_lines("--changeset a:1\nIF x > 1\n  y := 1;\n  z := 2;\nIF a > 1\nTHEN b := 1;");
        let result = run(check_dangling_if, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_then_within_two_lines() {
        let lines = split_lines("--changeset a:1\nIF x > 1\n  AND y > 2\n  THEN z := 1;");
        assert!(run(check_dangling_if, &lines).is_valid());

        let lines = split_lines("--changeset a:1\nIF x > 1\n  AND y > 2\n  AND w > 3\n  THEN z := 1;");
        let result = run(check_dangling_if, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_if_exists_guards_are_exempt() {
        let lines = split_lines("--changeset a:1\nDROP TABLE IF EXISTS t;\nCREATE TABLE IF NOT EXISTS t (id INT);");
        assert!(run(check_dangling_if, &lines).is_valid());
    }

    #[test]
    fn test_double_semicolon() {
        let lines = split_lines("--changeset a:1\nSELECT 1;;\n-- ;;");
        let result = run(check_double_semicolon, &lines);
        assert_eq!(offsets(&result), vec![2]);
    }

    #[test]
    fn test_reserved_words() {
        let lines = split_lines("--changeset a:1\n  user VARCHAR(50),\n  level int not null,\n  \"order\" INT");
        let result = run(check_reserved_words, &lines);
        let messages: Vec<&str> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Reserved word 'USER' as column name - use quotes",
                "Reserved word 'LEVEL' as column name - use quotes",
            ]
        );
    }
}
