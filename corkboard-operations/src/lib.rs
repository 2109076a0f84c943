//! # Corkboard Operations
//!
//! This crate provides the `Operation` trait for defining board operations.
//! Operations are structs where the fields ARE the parameters.
//!
//! ## Example
//!
//! ```ignore
//! use corkboard_operations::*;
//!
//! #[operation(verb = "add", noun = "card", description = "Create a new card")]
//! #[derive(Debug, Deserialize, Serialize)]
//! pub struct AddCard {
//!     pub column_id: ColumnId,
//!     pub title: String,
//! }
//!
//! #[async_trait]
//! impl Execute<KanbanSession, KanbanError> for AddCard {
//!     type Output = PatchBatch;
//!
//!     async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
//!         // implementation returns ExecutionResult::Logged or Unlogged
//!     }
//! }
//! ```

// Lets the `#[operation]` expansion resolve inside this crate's own tests
extern crate self as corkboard_operations;

mod execution_result;
mod log;
mod operation;
mod processor;

pub use execution_result::ExecutionResult;
pub use log::LogEntry;
pub use operation::{Execute, Operation};
pub use processor::OperationProcessor;

// Re-export proc macro
pub use corkboard_operations_macros::operation;

// Re-export for use in implementations
pub use async_trait::async_trait;
pub use serde_json::Value;
