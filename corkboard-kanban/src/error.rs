//! Error types for the kanban engine

use crate::capability::Capability;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for kanban operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// Coarse classification of a [`KanbanError`], as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or a dangling anchor/target reference
    Validation,
    /// The acting user lacks the required capability
    PermissionDenied,
    /// A referenced entity does not exist (possibly deleted concurrently)
    NotFound,
    /// Structural conflict detected by storage
    Conflict,
    /// I/O, serialization or configuration failure
    Internal,
}

/// Errors that can occur in kanban operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// Board not initialized at the given path
    #[error("board not initialized at {path}")]
    NotInitialized { path: PathBuf },

    /// Board already exists
    #[error("board already exists at {path}")]
    AlreadyExists { path: PathBuf },

    /// Column not found
    #[error("column not found: {id}")]
    ColumnNotFound { id: String },

    /// Card not found
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// Discussion message not found
    #[error("message not found: {id}")]
    MessageNotFound { id: String },

    /// User not registered
    #[error("user not found: {id}")]
    UserNotFound { id: String },

    /// Anchor exists but cannot be used for this insertion
    #[error("invalid anchor {anchor}: {message}")]
    InvalidAnchor { anchor: String, message: String },

    /// Column is locked against card changes
    #[error("column '{id}' is locked")]
    ColumnLocked { id: String },

    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Actor lacks the capability required by the operation
    #[error("permission denied: {user} lacks '{capability}'")]
    PermissionDenied {
        capability: Capability,
        user: String,
    },

    /// Stored structure disagrees with itself
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Lock is held by another process
    #[error("lock busy - another operation in progress")]
    LockBusy,

    /// Configuration could not be loaded
    #[error("configuration error: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KanbanError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid anchor error
    pub fn invalid_anchor(anchor: impl ToString, message: impl Into<String>) -> Self {
        Self::InvalidAnchor {
            anchor: anchor.to_string(),
            message: message.into(),
        }
    }

    /// Create a permission error
    pub fn permission_denied(capability: Capability, user: impl ToString) -> Self {
        Self::PermissionDenied {
            capability,
            user: user.to_string(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAnchor { .. }
            | Self::ColumnLocked { .. }
            | Self::MissingField { .. }
            | Self::InvalidValue { .. }
            | Self::AlreadyExists { .. } => ErrorKind::Validation,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::NotInitialized { .. }
            | Self::ColumnNotFound { .. }
            | Self::CardNotFound { .. }
            | Self::MessageNotFound { .. }
            | Self::UserNotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } | Self::LockBusy => ErrorKind::Conflict,
            Self::Config { .. } | Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockBusy)
    }
}
