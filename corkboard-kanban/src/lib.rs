//! Authoritative kanban board engine
//!
//! This crate owns the canonical order of a board: columns on the board and
//! cards in each column. Every mutation checks the actor's capabilities,
//! validates the ids it references, computes new sequences with [`order`],
//! and answers with an ordered [`PatchBatch`] of absolute-state entries that
//! clients apply to their mirror.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use corkboard_kanban::{
//!     board::InitBoard, card::AddCard, CapabilitySet, KanbanContext, KanbanOperationProcessor,
//!     KanbanSession, OperationProcessor,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = KanbanContext::open("/path/to/board")?;
//! let session = KanbanSession::new(ctx, "alice", CapabilitySet::all());
//! let processor = KanbanOperationProcessor::new();
//!
//! processor.process(&InitBoard::new("Sprint 12"), &session).await?;
//! let board = session.ctx().read_board().await?;
//!
//! let batch = processor
//!     .process(&AddCard::new(board.sequence[0].clone(), "Write release notes"), &session)
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&batch)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Structure
//!
//! ```text
//! board/
//! ├── board.json              # Board name + column order
//! ├── corkboard.toml          # Optional configuration
//! ├── columns/{id}.json       # Column title, lock, card order
//! ├── cards/{id}.json         # Card fields + discussion order
//! ├── messages/{id}.json      # Discussion messages
//! ├── users/{id}.json         # Registered users
//! └── activity/current.jsonl  # Operation log
//! ```
//!
//! Orders are stored as comma-joined id lists.

pub mod capability;
pub mod config;
mod context;
mod error;
pub mod order;
pub mod patch;
mod processor;
mod session;
pub mod types;

// Command modules
pub mod board;
pub mod card;
pub mod column;
pub mod discussion;

pub use capability::{Capability, CapabilityProvider, CapabilitySet, StaticCapabilities};
pub use config::KanbanConfig;
pub use context::{KanbanContext, KanbanLock};
pub use error::{ErrorKind, KanbanError, Result};
pub use order::Anchor;
pub use patch::{Action, Collection, PatchBatch, PatchEntry};
pub use processor::KanbanOperationProcessor;
pub use session::KanbanSession;

pub use corkboard_operations::{Execute, ExecutionResult, LogEntry, Operation, OperationProcessor};
