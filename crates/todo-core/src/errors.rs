//! Service error taxonomy.
//!
//! Every task operation fails with one of three kinds. The HTTP layer maps
//! them to 400, 404 and 500 respectively.

use std::error::Error as StdError;

// ── Error code constants ────────────────────────────────────────────

/// Required input missing or malformed.
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
/// Referenced task does not exist.
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Unexpected failure underneath the service.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Message sent to clients in place of any internal failure detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

/// Boxed cause carried by [`ServiceError::Internal`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error returned by task service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A required input was absent or unusable.
    #[error("{message}")]
    InvalidArgument {
        /// Description of what is wrong.
        message: String,
    },

    /// The referenced task does not exist.
    #[error("{message}")]
    NotFound {
        /// Human-readable message.
        message: String,
    },

    /// Anything else, with the underlying cause attached.
    #[error("{message}")]
    Internal {
        /// Operation that failed (e.g. "Failed to create task").
        message: String,
        /// Original failure.
        #[source]
        source: BoxError,
    },
}

impl ServiceError {
    /// Build an [`InvalidArgument`](Self::InvalidArgument).
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Build a [`NotFound`](Self::NotFound).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Wrap `source` in an [`Internal`](Self::Internal) with an operation message.
    pub fn internal(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Machine-readable error code for this variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => INVALID_ARGUMENT,
            Self::NotFound { .. } => NOT_FOUND,
            Self::Internal { .. } => INTERNAL_ERROR,
        }
    }

    /// Message safe to show a client.
    ///
    /// Invalid-argument and not-found messages pass through. Internal errors
    /// collapse to [`INTERNAL_ERROR_MESSAGE`].
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidArgument { message } | Self::NotFound { message } => message.clone(),
            Self::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}
