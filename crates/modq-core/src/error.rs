//! Error types for the moderation queue
//!
//! None of these reach the operator directly: user-facing failures are
//! published through the notification channel. Precondition errors are
//! returned so callers can tell a rejected request from an accepted one.

use thiserror::Error;

use crate::models::{ItemId, Status};

/// Result type alias for moderation queue operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the moderation queue
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Resource Not Found Errors
    // ==========================================================================
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    #[error("Duplicate item id: {0}")]
    DuplicateItemId(ItemId),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ==========================================================================
    // Precondition Errors
    // ==========================================================================
    #[error("Nothing selected")]
    EmptySelection,

    #[error("Resource busy: {0}")]
    Busy(&'static str),

    // ==========================================================================
    // Backend Errors
    // ==========================================================================
    #[error("Backend error: {0}")]
    Backend(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error type string
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::ItemNotFound(_) => "NOT_FOUND",
            Self::DuplicateItemId(_) | Self::InvalidTransition { .. } | Self::InvalidArgument(_) => {
                "INVALID_ARGUMENT"
            }
            Self::EmptySelection => "PRECONDITION_FAILED",
            Self::Busy(_) => "RESOURCE_BUSY",
            Self::Backend(_) => "BACKEND_ERROR",
            Self::Io(_) => "OS_ERROR",
            Self::Serialization(_) => "TYPE_ERROR",
        }
    }

    /// Returns whether the request can succeed if retried later
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ItemNotFound(_)
                | Self::InvalidArgument(_)
                | Self::EmptySelection
                | Self::Busy(_)
                | Self::Backend(_)
        )
    }
}
