//! Changelog Parser
//!
//! Line classification and changeset segmentation. No SQL grammar lives here:
//! lines are only sorted into comments, rollbacks and statements, then grouped
//! by their `--changeset` markers.

pub mod line;
pub mod segment;

pub use line::{classify_line, is_comment_line, is_rollback_line, LineKind};
pub use segment::{find_changeset, segment_changesets, ChangesetKey, Segment};

/// Split script text into owned lines, dropping line terminators
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
