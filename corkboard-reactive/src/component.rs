//! Components, the events they watch, and what they may ask for in return

use crate::dragdrop::DropData;
use crate::intent::Intent;
use crate::store::StateStore;
use corkboard_kanban::patch::{Action, Collection, PatchEntry};
use std::any::Any;
use std::fmt;

/// Identifies a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A (collection, id) pair a component wants notifications for
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Watch {
    pub collection: Collection,
    pub id: String,
}

impl Watch {
    pub fn new(collection: Collection, id: impl AsRef<str>) -> Self {
        Self {
            collection,
            id: id.as_ref().to_string(),
        }
    }
}

/// A notification `(collection, id, action)`, delivered after a batch is
/// fully merged
///
/// `entry` is the patch that caused it, so watchers can look at exactly the
/// fields that were sent. Discussion events use the owning card's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub collection: Collection,
    pub id: String,
    pub action: Action,
    pub entry: Option<PatchEntry>,
}

impl Event {
    pub fn from_entry(entry: &PatchEntry) -> Self {
        Self {
            collection: entry.collection(),
            id: entry.watch_id().to_string(),
            action: entry.action(),
            entry: Some(entry.clone()),
        }
    }

    /// An update with no patch behind it, e.g. a loading flag flipping
    pub fn touched(collection: Collection, id: impl AsRef<str>) -> Self {
        Self {
            collection,
            id: id.as_ref().to_string(),
            action: Action::Update,
            entry: None,
        }
    }

    pub fn watch(&self) -> Watch {
        Watch::new(self.collection, &self.id)
    }
}

/// Collects what a component asks for while handling a notification or a
/// drop. Intents are queued behind the batch being delivered.
#[derive(Debug, Default)]
pub struct ComponentContext {
    intents: Vec<Intent>,
    destroy: bool,
}

impl ComponentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Ask to be unregistered once this callback returns
    pub fn destroy(&mut self) {
        self.destroy = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroy
    }

    pub fn into_parts(self) -> (Vec<Intent>, bool) {
        (self.intents, self.destroy)
    }
}

/// A reactive view bound to mirrored entities
pub trait Component: Any + Send {
    /// What this component is notified about; fixed for its lifetime
    fn watches(&self) -> Vec<Watch>;

    /// Handle one event. The store already holds the whole batch.
    fn notify(&mut self, event: &Event, store: &StateStore, cx: &mut ComponentContext);

    /// Payload for a drag starting here, if dragging is allowed right now
    fn drag_data(&self) -> Option<DropData> {
        None
    }

    /// Whether drops may land on this component
    fn accepts_drops(&self) -> bool {
        false
    }

    /// Handle a drop; returns true if it was accepted
    fn on_drop(&mut self, _data: &DropData, _cx: &mut ComponentContext) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}
