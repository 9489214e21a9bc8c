//! Typo Catalogs
//!
//! Known keyword misspellings as plain data. Adding a misspelling is a new
//! table row, not a new check.

use std::sync::LazyLock;

use regex::Regex;

use super::engine::{Check, Severity};

/// One known misspelling
#[derive(Debug, Clone, Copy)]
pub struct TypoPattern {
    pub pattern: &'static str,
    pub message: &'static str,
    pub severity: Severity,
}

const fn typo(pattern: &'static str, message: &'static str, severity: Severity) -> TypoPattern {
    TypoPattern {
        pattern,
        message,
        severity,
    }
}

pub const CREATE_TYPOS: &[TypoPattern] = &[
    typo(r"\bCREAE\b", "'CREAE' should be 'CREATE'", Severity::Critical),
    typo(r"\bCREAT\s+TABLE\b", "'CREAT TABLE' should be 'CREATE TABLE'", Severity::Critical),
    typo(
        r"\bCREAT\s+PROCEDURE\b",
        "'CREAT PROCEDURE' should be 'CREATE PROCEDURE'",
        Severity::Critical,
    ),
    typo(
        r"\bCREAT\s+FUNCTION\b",
        "'CREAT FUNCTION' should be 'CREATE FUNCTION'",
        Severity::Critical,
    ),
    typo(r"\bCREAT\s+INDEX\b", "'CREAT INDEX' should be 'CREATE INDEX'", Severity::Critical),
];

pub const ALTER_TYPOS: &[TypoPattern] = &[
    typo(r"\bALTR\b", "'ALTR' should be 'ALTER'", Severity::Error),
    typo(r"\bALTE\s+TABLE\b", "'ALTE TABLE' should be 'ALTER TABLE'", Severity::Error),
];

pub const KEYWORD_TYPOS: &[TypoPattern] = &[
    typo(r"\bTABEL\b", "'TABEL' should be 'TABLE'", Severity::Error),
    typo(r"\bPROCEDUR\b", "'PROCEDUR' should be 'PROCEDURE'", Severity::Error),
    typo(r"\bFUNCTIO\b", "'FUNCTIO' should be 'FUNCTION'", Severity::Error),
    typo(r"\bINSERT\s+INT\b", "'INSERT INT' should be 'INSERT INTO'", Severity::Error),
    typo(r"\bINSRT\b", "'INSRT' should be 'INSERT'", Severity::Error),
    typo(r"\bSELCT\b", "'SELCT' should be 'SELECT'", Severity::Error),
    typo(r"\bDELTE\b", "'DELTE' should be 'DELETE'", Severity::Error),
    typo(
        r"\bUPDATE\b.*\bSET\b.*\bWHERE\b.*\bADN\b",
        "'ADN' should be 'AND'",
        Severity::Error,
    ),
    typo(r"\bAD\s+COLUMN\b", "'AD COLUMN' should be 'ADD COLUMN'", Severity::Error),
    typo(
        r"\bAD\s+CONSTRAINT\b",
        "'AD CONSTRAINT' should be 'ADD CONSTRAINT'",
        Severity::Error,
    ),
];

/// A catalog entry with its pattern compiled case-insensitively
#[derive(Debug)]
pub struct CompiledTypo {
    pub regex: Regex,
    pub check: Check,
    pub entry: TypoPattern,
}

/// All catalogs, compiled once, in battery order
pub static TYPO_CATALOG: LazyLock<Vec<CompiledTypo>> = LazyLock::new(|| {
    [
        (Check::CreateTypo, CREATE_TYPOS),
        (Check::AlterTypo, ALTER_TYPOS),
        (Check::KeywordTypo, KEYWORD_TYPOS),
    ]
    .into_iter()
    .flat_map(|(check, table)| {
        table.iter().map(move |entry| CompiledTypo {
            regex: Regex::new(&format!("(?i){}", entry.pattern)).expect("typo catalog pattern"),
            check,
            entry: *entry,
        })
    })
    .collect()
});
