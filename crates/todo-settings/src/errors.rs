//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Figment could not merge or extract the layers.
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// An explicitly requested settings file does not exist.
    #[error("settings file not found: {}", path.display())]
    MissingFile {
        /// Path that was requested.
        path: PathBuf,
    },

    /// A value parsed but is out of range.
    #[error("invalid settings value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted key (e.g. `database.pool_size`).
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<figment::Error> for SettingsError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
