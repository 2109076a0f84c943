//! The client loop: mirror, watchers, intent queue and dispatch
//!
//! Nothing here runs re-entrantly. Watchers are notified only after a batch
//! is fully merged, and any intent they raise is queued behind it. The
//! queue drains in [`Reactive::process`], one intent at a time.

use crate::component::{Component, ComponentContext, ComponentId, Event, Watch};
use crate::dragdrop::DragDrop;
use crate::error::{ReactiveError, Result};
use crate::intent::Intent;
use crate::store::StateStore;
use async_trait::async_trait;
use corkboard_kanban::patch::Collection;
use corkboard_kanban::types::CardId;
use corkboard_kanban::PatchBatch;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, warn};

/// Carries intents to the board engine and brings back its batch
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, intent: &Intent) -> Result<PatchBatch>;
}

/// Shows a failed intent to the user
pub trait FailureReporter: Send + Sync {
    fn report(&self, intent: &Intent, error: &ReactiveError);
}

/// Reports failures to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFailures;

impl FailureReporter for LogFailures {
    fn report(&self, intent: &Intent, error: &ReactiveError) {
        warn!(intent = intent.name(), error = %error, "intent failed");
    }
}

/// One discussion refresh in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionTicket {
    pub card_id: CardId,
    pub request: u64,
}

/// Per-card request counters for discussion refreshes
#[derive(Debug, Default)]
pub struct DiscussionRequests {
    issued: BTreeMap<CardId, u64>,
    applied: BTreeMap<CardId, u64>,
}

impl DiscussionRequests {
    pub fn begin(&mut self, card_id: &CardId) -> DiscussionTicket {
        let request = self.issued.entry(card_id.clone()).or_insert(0);
        *request += 1;
        DiscussionTicket {
            card_id: card_id.clone(),
            request: *request,
        }
    }

    /// True if the response is newer than every response applied so far
    /// for the card; records it as the latest
    pub fn accept(&mut self, ticket: &DiscussionTicket) -> bool {
        let latest = self.applied.get(&ticket.card_id).copied().unwrap_or(0);
        if ticket.request <= latest {
            return false;
        }
        self.applied.insert(ticket.card_id.clone(), ticket.request);
        true
    }
}

/// A board session on the client
pub struct Reactive<D, R = LogFailures> {
    store: StateStore,
    dispatcher: D,
    reporter: R,
    components: BTreeMap<ComponentId, Box<dyn Component>>,
    watchers: BTreeMap<Watch, BTreeSet<ComponentId>>,
    queue: VecDeque<Intent>,
    drag: DragDrop,
    discussions: DiscussionRequests,
    next_id: u64,
}

impl<D: Dispatcher> Reactive<D> {
    pub fn new(store: StateStore, dispatcher: D) -> Self {
        Self::with_reporter(store, dispatcher, LogFailures)
    }
}

impl<D: Dispatcher, R: FailureReporter> Reactive<D, R> {
    pub fn with_reporter(store: StateStore, dispatcher: D, reporter: R) -> Self {
        Self {
            store,
            dispatcher,
            reporter,
            components: BTreeMap::new(),
            watchers: BTreeMap::new(),
            queue: VecDeque::new(),
            drag: DragDrop::new(),
            discussions: DiscussionRequests::default(),
            next_id: 1,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn drag(&self) -> &DragDrop {
        &self.drag
    }

    /// Intents waiting for [`process`](Self::process)
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn register<C: Component>(&mut self, component: C) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;

        for watch in component.watches() {
            self.watchers.entry(watch).or_default().insert(id);
        }
        if component.accepts_drops() {
            self.drag.add_target(id);
        }
        self.components.insert(id, Box::new(component));
        debug!(component = %id, "registered component");
        id
    }

    /// Drop a component with its watches and drag-and-drop state; false if
    /// it was not registered
    pub fn unregister(&mut self, id: ComponentId) -> bool {
        let Some(component) = self.components.remove(&id) else {
            return false;
        };
        for watch in component.watches() {
            if let Some(ids) = self.watchers.get_mut(&watch) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.watchers.remove(&watch);
                }
            }
        }
        self.drag.release(id);
        debug!(component = %id, "unregistered component");
        true
    }

    pub fn component<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.components
            .get(&id)
            .and_then(|component| component.as_any().downcast_ref::<T>())
    }

    pub fn is_registered(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// True if any component watches the collection and id
    pub fn is_watched(&self, collection: Collection, id: impl AsRef<str>) -> bool {
        self.watchers.contains_key(&Watch::new(collection, id))
    }

    /// Queue an intent; nothing is sent until [`process`](Self::process)
    pub fn dispatch(&mut self, intent: Intent) {
        debug!(intent = intent.name(), "queued intent");
        self.queue.push_back(intent);
    }

    /// Drain the queue, including intents raised while draining. Returns
    /// the number of intents handled.
    pub async fn process(&mut self) -> usize {
        let mut handled = 0;
        while let Some(intent) = self.queue.pop_front() {
            handled += 1;
            match intent {
                Intent::ProcessUpdates { batch } => self.apply(&batch),
                Intent::GetDiscussionUpdates { ref card_id } => {
                    let ticket = self.begin_discussion_refresh(card_id);
                    let result = self.dispatcher.dispatch(&intent).await;
                    self.complete_discussion_refresh(&ticket, result);
                }
                intent => match self.dispatcher.dispatch(&intent).await {
                    Ok(batch) => self.apply(&batch),
                    Err(error) => self.reporter.report(&intent, &error),
                },
            }
        }
        handled
    }

    /// Merge a batch into the mirror, then notify watchers
    pub fn apply(&mut self, batch: &PatchBatch) {
        let events = self.store.apply(batch);
        debug!(entries = batch.len(), "applied batch");
        self.notify(events);
    }

    /// Mark a card's discussion as loading and hand out a ticket for the
    /// response
    pub fn begin_discussion_refresh(&mut self, card_id: &CardId) -> DiscussionTicket {
        let ticket = self.discussions.begin(card_id);
        if self.store.set_discussion_loading(card_id, true) {
            self.notify(vec![Event::touched(Collection::Discussions, card_id)]);
        }
        ticket
    }

    /// Settle a discussion refresh. Loading clears on any arrival; the
    /// batch applies only if no newer response was applied first.
    pub fn complete_discussion_refresh(
        &mut self,
        ticket: &DiscussionTicket,
        result: Result<PatchBatch>,
    ) {
        let mut events = Vec::new();
        if self.store.set_discussion_loading(&ticket.card_id, false) {
            events.push(Event::touched(Collection::Discussions, &ticket.card_id));
        }

        match result {
            Ok(batch) if self.discussions.accept(ticket) => {
                events.extend(self.store.apply(&batch));
            }
            Ok(_) => {
                warn!(card = %ticket.card_id, request = ticket.request, "dropped stale discussion response");
            }
            Err(error) => {
                let intent = Intent::GetDiscussionUpdates {
                    card_id: ticket.card_id.clone(),
                };
                self.reporter.report(&intent, &error);
            }
        }
        self.notify(events);
    }

    /// Start dragging from a component; false if it offers nothing to drag
    /// or another gesture is in flight
    pub fn drag_start(&mut self, source: ComponentId) -> bool {
        let Some(data) = self.components.get(&source).and_then(|c| c.drag_data()) else {
            return false;
        };
        self.drag.start(source, data)
    }

    /// End the gesture on a component. Returns true if the target accepted
    /// the payload.
    pub fn drop_onto(&mut self, target: ComponentId) -> bool {
        let Some(data) = self.drag.finish() else {
            return false;
        };
        if !self.drag.is_target(target) {
            return false;
        }
        let Some(component) = self.components.get_mut(&target) else {
            return false;
        };
        let mut cx = ComponentContext::new();
        let accepted = component.on_drop(&data, &mut cx);
        self.settle(target, cx);
        accepted
    }

    fn notify(&mut self, events: Vec<Event>) {
        for event in events {
            let Some(ids) = self.watchers.get(&event.watch()) else {
                continue;
            };
            let ids: Vec<ComponentId> = ids.iter().copied().collect();
            for id in ids {
                // Destroyed earlier in this batch
                let Some(component) = self.components.get_mut(&id) else {
                    continue;
                };
                let mut cx = ComponentContext::new();
                component.notify(&event, &self.store, &mut cx);
                self.settle(id, cx);
            }
        }
    }

    fn settle(&mut self, id: ComponentId, cx: ComponentContext) {
        let (intents, destroy) = cx.into_parts();
        self.queue.extend(intents);
        if destroy {
            self.unregister(id);
        }
    }
}
