//! Changeset Segmenter
//!
//! Splits a script into contiguous changeset segments. A segment starts at a
//! `--changeset` marker and runs up to the line before the next marker, or to
//! the end of the file. Content before the first marker belongs to no segment.

use std::fmt;
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;
use serde::Serialize;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*--\s*changeset(\s|$)").expect("changeset marker pattern")
});

static IDENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)changeset\s+([^:\s]+):(\S+)").expect("changeset identity pattern")
});

/// Identity of a changeset: `author:id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ChangesetKey {
    pub author: String,
    pub id: String,
}

impl ChangesetKey {
    pub fn new(author: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            id: id.into(),
        }
    }

    /// Key given to a marker that declares no identity
    pub fn synthetic(line: usize) -> Self {
        Self::new("unknown", line.to_string())
    }

    /// Parse `author:id`, splitting on the first colon
    pub fn parse(text: &str) -> Result<Self> {
        match text.split_once(':') {
            Some((author, id)) if !author.is_empty() && !id.is_empty() => {
                Ok(Self::new(author, id))
            }
            _ => bail!("invalid changeset identity '{}', expected 'author:id'", text),
        }
    }
}

impl fmt::Display for ChangesetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.author, self.id)
    }
}

/// One changeset, borrowing its lines from the script
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a> {
    pub key: ChangesetKey,
    /// Absolute line of the marker (1-based)
    pub start_line: usize,
    /// Absolute last line, inclusive
    pub end_line: usize,
    pub lines: &'a [String],
}

impl Segment<'_> {
    /// Convert a 1-based offset within the segment to an absolute line
    pub fn absolute_line(&self, offset: usize) -> usize {
        self.start_line + offset - 1
    }
}

/// Check whether a line opens a new changeset
pub fn is_marker(line: &str) -> bool {
    MARKER.is_match(line)
}

/// Extract the declared identity from a marker line
pub fn marker_key(line: &str, line_number: usize) -> ChangesetKey {
    IDENTITY
        .captures(line)
        .and_then(|caps| Some(ChangesetKey::new(caps.get(1)?.as_str(), caps.get(2)?.as_str())))
        .unwrap_or_else(|| ChangesetKey::synthetic(line_number))
}

/// Partition script lines into changeset segments, in file order
pub fn segment_changesets(lines: &[String]) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut open: Option<(ChangesetKey, usize)> = None;

    for (idx, line) in lines.iter().enumerate() {
        if !is_marker(line) {
            continue;
        }
        let line_number = idx + 1;
        if let Some((key, start)) = open.take() {
            segments.push(Segment {
                key,
                start_line: start,
                end_line: line_number - 1,
                lines: &lines[start - 1..idx],
            });
        }
        open = Some((marker_key(line, line_number), line_number));
    }

    if let Some((key, start)) = open {
        segments.push(Segment {
            key,
            start_line: start,
            end_line: lines.len(),
            lines: &lines[start - 1..],
        });
    }

    segments
}

/// Find the segment belonging to the active changeset.
///
/// Returns `None` when no identity is active or none of the segments carries
/// it. Duplicate identities are not detected; the first one wins.
pub fn find_changeset<'a>(
    lines: &'a [String],
    active: Option<&ChangesetKey>,
) -> Option<Segment<'a>> {
    let active = active?;
    segment_changesets(lines)
        .into_iter()
        .find(|segment| &segment.key == active)
}
