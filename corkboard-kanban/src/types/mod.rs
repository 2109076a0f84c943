//! Core types for the kanban engine

mod board;
mod card;
mod ids;

// Re-export all types
pub use board::{Board, Column, User};
pub use card::{Attachment, Card, Message};
pub use ids::{BoardId, CardId, ColumnId, MessageId, UserId};
