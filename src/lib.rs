//! Changeset Check
//!
//! Structural validation for Liquibase "formatted SQL" changelogs.
//!
//! This library provides:
//! - Changeset segmentation by `--changeset` markers
//! - A battery of heuristic syntax checks over one changeset
//! - Severity-ranked reports anchored to absolute file lines
//! - Configuration management

pub mod config;
pub mod context;
pub mod parser;
pub mod report;
pub mod validation;

// Re-exports for clean public API
pub use config::{Config, OutputFormat};
pub use context::{validate_changeset, validate_text, ChangesetContext, ValidationOutcome};
pub use parser::{find_changeset, segment_changesets, ChangesetKey, Segment};
pub use report::{Report, ReportEntry, ReportSummary};
pub use validation::{evaluate, Check, Diagnostic, Severity};
