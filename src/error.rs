use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for a generation run.
///
/// `FontUnusable` is the only recoverable variant: the caller drops the font
/// and keeps going. Everything else aborts the operation that raised it and
/// leaves already-written output in place (no rollback).
#[derive(Debug, Error)]
pub enum GenError {
    /// The font cannot be instantiated or measured at any size in the search
    /// range. Raised once per font; the whole font is skipped.
    #[error("font '{font}' is unusable: {reason}")]
    FontUnusable { font: String, reason: String },

    /// A target directory is already populated. Refusing to merge keeps two
    /// unrelated generation runs from mixing.
    #[error("target '{0}' already exists and is not empty")]
    TargetExists(PathBuf),

    /// An operation was invoked before its inputs were loaded.
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(&'static str),

    /// The configured output root does not exist and creating it was not
    /// permitted.
    #[error("output root '{0}' does not exist (pass --create-root to create it)")]
    RootMissing(PathBuf),
}

impl GenError {
    /// Whether the caller should skip the offending font and continue the run.
    pub fn is_font_unusable(&self) -> bool {
        matches!(self, GenError::FontUnusable { .. })
    }
}
