//! Validation Engine
//!
//! Structural checks for one changeset, kept apart from segmentation and from
//! the command-line surface.

pub mod catalog;
pub mod engine;
pub mod rules;

pub use engine::{evaluate, validate_segment, Check, Diagnostic, Severity};

// Re-export common types
pub use engine::ValidationResult;
