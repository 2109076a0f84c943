//! Client-side mirror of a corkboard board
//!
//! The client never edits its copy of the board directly. Views raise
//! [`Intent`]s; a [`Dispatcher`] carries them to the board engine; the
//! [`PatchBatch`](corkboard_kanban::PatchBatch) that comes back is merged
//! into the [`StateStore`] and only then announced to watching components.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use corkboard_kanban::{CapabilitySet, KanbanContext, KanbanSession};
//! use corkboard_reactive::{
//!     CardView, LocalDispatcher, Reactive, StateStore, SystemClock,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = KanbanContext::open("/path/to/board")?;
//! let session = KanbanSession::new(ctx, "alice", CapabilitySet::all());
//! let dispatcher = LocalDispatcher::new(session);
//! let snapshot = dispatcher.snapshot().await?;
//!
//! let mut reactive = Reactive::new(StateStore::new(dispatcher.session_info()), dispatcher);
//! reactive.apply(&snapshot);
//!
//! let cards: Vec<_> = reactive
//!     .store()
//!     .ordered_columns()
//!     .iter()
//!     .flat_map(|column| column.sequence.clone())
//!     .collect();
//! for card in cards {
//!     let view = CardView::new(card, reactive.store(), Arc::new(SystemClock));
//!     reactive.register(view);
//! }
//! reactive.process().await;
//! # Ok(())
//! # }
//! ```

pub mod card_view;
mod clock;
pub mod component;
pub mod dragdrop;
mod error;
pub mod intent;
mod local;
pub mod reactive;
pub mod relative_time;
pub mod store;

pub use card_view::{ActionOutcome, CardAction, CardRender, CardView, Redraw};
pub use clock::{Clock, FixedClock, SystemClock};
pub use component::{Component, ComponentContext, ComponentId, Event, Watch};
pub use dragdrop::{DragDrop, DropData};
pub use error::{ReactiveError, Result};
pub use intent::Intent;
pub use local::LocalDispatcher;
pub use reactive::{Dispatcher, DiscussionTicket, FailureReporter, LogFailures, Reactive};
pub use relative_time::{DueRender, RelativeTimeFormatter};
pub use store::{SessionInfo, StateStore};
