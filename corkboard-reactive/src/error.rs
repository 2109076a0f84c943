//! Error types for the client mirror

use corkboard_kanban::{ErrorKind, KanbanError};
use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ReactiveError>;

/// Errors surfaced by dispatch
#[derive(Debug, Clone, Error)]
pub enum ReactiveError {
    /// The board engine refused the intent
    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },

    /// The transport failed to deliver the intent or its answer
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl ReactiveError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// The engine's classification, if the engine answered
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Rejected { kind, .. } => Some(*kind),
            Self::Transport { .. } => None,
        }
    }
}

impl From<KanbanError> for ReactiveError {
    fn from(error: KanbanError) -> Self {
        Self::Rejected {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
