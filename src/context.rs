//! Changeset Validation Entry Points
//!
//! The migration engine owns changeset metadata; it hands it over as a
//! read-only [`ChangesetContext`] and gets a [`ValidationOutcome`] back.
//! Nothing is kept between calls: every run re-reads and re-segments the file.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::parser::{find_changeset, split_lines, ChangesetKey};
use crate::report::Report;
use crate::validation::evaluate;

/// Metadata of the changeset being applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangesetContext {
    pub author: Option<String>,
    pub id: Option<String>,
    /// Changelog file the changeset was declared in
    pub file_path: PathBuf,
}

impl ChangesetContext {
    pub fn new(author: Option<String>, id: Option<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            author,
            id,
            file_path: file_path.into(),
        }
    }

    /// Identity of the changeset, when the engine supplied both parts
    pub fn key(&self) -> Option<ChangesetKey> {
        match (&self.author, &self.id) {
            (Some(author), Some(id)) => Some(ChangesetKey::new(author.as_str(), id.as_str())),
            _ => None,
        }
    }
}

/// What a validation run concluded
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The file type is not validated
    Skipped { extension: String },
    /// No changeset in the file carries the active identity
    NotFound { key: Option<ChangesetKey> },
    /// The changeset was checked
    Checked(Report),
}

impl ValidationOutcome {
    /// Only a checked changeset with diagnostics fails
    pub fn fired(&self) -> bool {
        matches!(self, Self::Checked(report) if report.fired())
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Checked(report) => Some(report),
            _ => None,
        }
    }
}

/// Validate the active changeset of an in-memory script
pub fn validate_text(text: &str, active: Option<&ChangesetKey>) -> ValidationOutcome {
    let lines = split_lines(text);
    match find_changeset(&lines, active) {
        Some(segment) => {
            log::debug!(
                "Checking {} (lines {}-{})",
                segment.key,
                segment.start_line,
                segment.end_line
            );
            ValidationOutcome::Checked(evaluate(&segment))
        }
        None => {
            let shown = active.map_or_else(|| "<none>".to_string(), ToString::to_string);
            log::info!("Changeset {} not found", shown);
            ValidationOutcome::NotFound {
                key: active.cloned(),
            }
        }
    }
}

/// Validate the changeset described by `context`.
///
/// Fails only when the changelog cannot be read; diagnostics and a missing
/// changeset are both reported through the outcome.
pub fn validate_changeset(context: &ChangesetContext, config: &Config) -> Result<ValidationOutcome> {
    let path = &context.file_path;
    if !config.accepts(path) {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        log::info!("{} file extension skipped.", extension);
        return Ok(ValidationOutcome::Skipped { extension });
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    log::debug!("Read {} bytes from {}", text.len(), path.display());

    Ok(validate_text(&text, context.key().as_ref()))
}
