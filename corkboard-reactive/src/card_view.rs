//! CardView - the reactive view of one card
//!
//! The view never edits the mirror. It renders from the store, records the
//! targeted redraws each notification calls for, and turns user actions and
//! drops into intents.

use crate::clock::Clock;
use crate::component::{Component, ComponentContext, Event, Watch};
use crate::dragdrop::DropData;
use crate::intent::Intent;
use crate::relative_time::{DueRender, RelativeTimeFormatter};
use crate::store::StateStore;
use corkboard_kanban::patch::{Action, CardFields, Collection, PatchEntry};
use corkboard_kanban::types::{Attachment, Card, CardId, ColumnId, MessageId, UserId};
use corkboard_kanban::{Anchor, Capability, CapabilitySet};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;

/// Draggable iff the actor may move any card, or may move assigned cards
/// and is assigned to this one
pub fn can_drag(capabilities: &CapabilitySet, card: &Card, actor: &UserId) -> bool {
    capabilities.has(Capability::MoveAllCards)
        || (capabilities.has(Capability::MoveAssignedCards) && card.is_assigned(actor))
}

/// What the card currently shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRender {
    pub id: CardId,
    pub column_id: ColumnId,
    pub title: String,
    pub description: String,
    pub attachments: Vec<Attachment>,
    pub assignees: Vec<UserId>,
    pub completed: bool,
    pub due: DueRender,
    pub discussion: Vec<MessageId>,
    pub discussion_loading: bool,
    pub draggable: bool,
}

/// A targeted change to the rendered card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "redraw", rename_all = "snake_case")]
pub enum Redraw {
    Attached,
    Reparent { column_id: ColumnId },
    Title { title: String },
    Description { description: String },
    AssigneeAdded { user: UserId },
    AssigneeRemoved { user: UserId },
    Completion { completed: bool },
    Due { due: DueRender },
    Attachments { attachments: Vec<Attachment> },
    Discussion { messages: Vec<MessageId>, loading: bool },
    Draggable { draggable: bool },
    Detached,
}

/// Things the user can do to a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    Complete,
    Uncomplete,
    ToggleComplete,
    /// Assign someone; the actor when `None`
    Assign(Option<UserId>),
    Unassign(Option<UserId>),
    /// Set or clear the due date (Unix seconds)
    SetDue(Option<i64>),
    Delete,
    /// Add a new card with this title right after this one
    AddAfter(String),
    SendMessage(String),
    DeleteMessage(MessageId),
    RefreshDiscussion,
}

/// What to do with an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Dispatch(Intent),
    /// Ask the user first, then dispatch
    Confirm(Intent),
    Ignored,
}

pub struct CardView {
    card_id: CardId,
    actor: UserId,
    clock: Arc<dyn Clock>,
    formatter: RelativeTimeFormatter,
    render: Option<CardRender>,
    redraws: Vec<Redraw>,
}

impl CardView {
    /// Bind a view to a card, rendering it if the mirror already has it
    pub fn new(card_id: impl Into<CardId>, store: &StateStore, clock: Arc<dyn Clock>) -> Self {
        let session = store.session();
        let mut view = Self {
            card_id: card_id.into(),
            actor: session.user_id.clone(),
            clock,
            formatter: RelativeTimeFormatter::new(session.lang.clone()),
            render: None,
            redraws: Vec::new(),
        };
        view.attach(store);
        view
    }

    pub fn card_id(&self) -> &CardId {
        &self.card_id
    }

    pub fn render(&self) -> Option<&CardRender> {
        self.render.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.render.is_some()
    }

    pub fn is_draggable(&self) -> bool {
        self.render.as_ref().is_some_and(|r| r.draggable)
    }

    /// Every redraw since the view was created, oldest first
    pub fn redraws(&self) -> &[Redraw] {
        &self.redraws
    }

    /// Map a user action to an intent. Deletions need confirmation.
    pub fn action(&self, action: CardAction) -> ActionOutcome {
        let Some(render) = &self.render else {
            return ActionOutcome::Ignored;
        };
        let id = self.card_id.clone();
        match action {
            CardAction::Complete => ActionOutcome::Dispatch(Intent::CompleteCard { id }),
            CardAction::Uncomplete => ActionOutcome::Dispatch(Intent::UncompleteCard { id }),
            CardAction::ToggleComplete if render.completed => {
                ActionOutcome::Dispatch(Intent::UncompleteCard { id })
            }
            CardAction::ToggleComplete => ActionOutcome::Dispatch(Intent::CompleteCard { id }),
            CardAction::Assign(user) => ActionOutcome::Dispatch(Intent::AssignUser { id, user }),
            CardAction::Unassign(user) => {
                ActionOutcome::Dispatch(Intent::UnassignUser { id, user })
            }
            CardAction::SetDue(due) => ActionOutcome::Dispatch(Intent::UpdateCard {
                id,
                title: None,
                description: None,
                due: Some(due),
            }),
            CardAction::Delete => ActionOutcome::Confirm(Intent::DeleteCard { id }),
            CardAction::AddAfter(title) if title.trim().is_empty() => ActionOutcome::Ignored,
            CardAction::AddAfter(title) => ActionOutcome::Dispatch(Intent::AddCard {
                column_id: render.column_id.clone(),
                anchor: Anchor::After(id),
                title,
            }),
            CardAction::SendMessage(body) if body.trim().is_empty() => ActionOutcome::Ignored,
            CardAction::SendMessage(body) => {
                ActionOutcome::Dispatch(Intent::SendDiscussionMessage { card_id: id, body })
            }
            CardAction::DeleteMessage(message) => {
                ActionOutcome::Confirm(Intent::DeleteMessage { id: message })
            }
            CardAction::RefreshDiscussion => {
                ActionOutcome::Dispatch(Intent::GetDiscussionUpdates { card_id: id })
            }
        }
    }

    fn due(&self, due: Option<i64>) -> DueRender {
        self.formatter.due(due, self.clock.now())
    }

    fn attach(&mut self, store: &StateStore) {
        let Some(card) = store.card(&self.card_id) else {
            return;
        };
        self.render = Some(CardRender {
            id: card.id.clone(),
            column_id: card.column_id.clone(),
            title: card.title.clone(),
            description: card.description.clone(),
            attachments: card.attachments.clone(),
            assignees: card.assignees.clone(),
            completed: card.completed,
            due: self.due(card.due),
            discussion: discussion_ids(store, &card.id),
            discussion_loading: store.is_discussion_loading(&card.id),
            draggable: can_drag(&store.actor_capabilities(), card, &self.actor),
        });
        self.redraws.push(Redraw::Attached);
    }

    fn detach(&mut self, cx: &mut ComponentContext) {
        if self.render.take().is_some() {
            self.redraws.push(Redraw::Detached);
        }
        cx.destroy();
    }

    /// Redraw only what the patch carried
    fn update(&mut self, fields: &CardFields, store: &StateStore) {
        let due = fields.due.map(|due| self.due(due));
        let Some(render) = self.render.as_mut() else {
            self.attach(store);
            return;
        };
        let redraws = &mut self.redraws;

        if let Some(column_id) = &fields.column_id {
            if *column_id != render.column_id {
                render.column_id = column_id.clone();
                redraws.push(Redraw::Reparent {
                    column_id: column_id.clone(),
                });
            }
        }
        if let Some(title) = &fields.title {
            if *title != render.title {
                render.title = title.clone();
                redraws.push(Redraw::Title {
                    title: title.clone(),
                });
            }
        }
        if let Some(description) = &fields.description {
            if *description != render.description {
                render.description = description.clone();
                redraws.push(Redraw::Description {
                    description: description.clone(),
                });
            }
        }
        if let Some(attachments) = &fields.attachments {
            if *attachments != render.attachments {
                render.attachments = attachments.clone();
                redraws.push(Redraw::Attachments {
                    attachments: attachments.clone(),
                });
            }
        }
        if let Some(assignees) = &fields.assignees {
            for user in render.assignees.iter().filter(|u| !assignees.contains(u)) {
                redraws.push(Redraw::AssigneeRemoved { user: user.clone() });
            }
            for user in assignees.iter().filter(|u| !render.assignees.contains(u)) {
                redraws.push(Redraw::AssigneeAdded { user: user.clone() });
            }
            render.assignees = assignees.clone();
        }
        if let Some(completed) = fields.completed {
            if completed != render.completed {
                render.completed = completed;
                redraws.push(Redraw::Completion { completed });
            }
        }
        if let Some(due) = due {
            if due != render.due {
                render.due = due.clone();
                redraws.push(Redraw::Due { due });
            }
        }

        if fields.assignees.is_some() {
            self.refresh_draggable(store);
        }
        if fields.discussion.is_some() {
            self.refresh_discussion(store);
        }
    }

    fn refresh_draggable(&mut self, store: &StateStore) {
        let (Some(render), Some(card)) = (self.render.as_mut(), store.card(&self.card_id)) else {
            return;
        };
        let draggable = can_drag(&store.actor_capabilities(), card, &self.actor);
        if draggable != render.draggable {
            render.draggable = draggable;
            self.redraws.push(Redraw::Draggable { draggable });
        }
    }

    fn refresh_discussion(&mut self, store: &StateStore) {
        let Some(render) = self.render.as_mut() else {
            return;
        };
        let messages = discussion_ids(store, &self.card_id);
        let loading = store.is_discussion_loading(&self.card_id);
        if messages != render.discussion || loading != render.discussion_loading {
            render.discussion = messages.clone();
            render.discussion_loading = loading;
            self.redraws.push(Redraw::Discussion { messages, loading });
        }
    }
}

fn discussion_ids(store: &StateStore, card: &CardId) -> Vec<MessageId> {
    store
        .discussion(card)
        .into_iter()
        .map(|message| message.id.clone())
        .collect()
}

impl Component for CardView {
    fn watches(&self) -> Vec<Watch> {
        vec![
            Watch::new(Collection::Cards, &self.card_id),
            Watch::new(Collection::Discussions, &self.card_id),
            Watch::new(Collection::Capabilities, &self.actor),
        ]
    }

    fn notify(&mut self, event: &Event, store: &StateStore, cx: &mut ComponentContext) {
        match (event.collection, event.action) {
            (Collection::Cards, Action::Delete) => self.detach(cx),
            (Collection::Cards, Action::Create) if self.render.is_none() => self.attach(store),
            (Collection::Cards, _) => {
                if let Some(PatchEntry::Cards { fields, .. }) = &event.entry {
                    self.update(fields, store);
                }
            }
            (Collection::Discussions, _) => self.refresh_discussion(store),
            (Collection::Capabilities, _) => self.refresh_draggable(store),
            _ => {}
        }
    }

    fn drag_data(&self) -> Option<DropData> {
        self.is_draggable().then(|| DropData::card(&self.card_id))
    }

    fn accepts_drops(&self) -> bool {
        true
    }

    /// Cards dropped here go right after this card, in this card's column
    fn on_drop(&mut self, data: &DropData, cx: &mut ComponentContext) -> bool {
        if !data.is_card() || data.id == self.card_id.as_str() {
            return false;
        }
        let Some(render) = &self.render else {
            return false;
        };
        cx.dispatch(Intent::MoveCard {
            id: CardId::from(data.id.as_str()),
            column_id: render.column_id.clone(),
            anchor: Anchor::After(self.card_id.clone()),
        });
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::SessionInfo;
    use corkboard_kanban::patch::ColumnFields;
    use corkboard_kanban::types::{Board, Column, Message};
    use corkboard_kanban::PatchBatch;

    const NOW: i64 = 1_700_000_000;

    struct Fixture {
        store: StateStore,
        todo: Column,
        done: Column,
        card: Card,
    }

    fn fixture(capabilities: CapabilitySet) -> Fixture {
        let mut board = Board::new("B");
        let mut todo = Column::new(board.id.clone(), "Todo");
        let done = Column::new(board.id.clone(), "Done");
        let mut card = Card::new(todo.id.clone(), "X");
        card.due = Some(NOW + 2 * 86_400);
        todo.sequence.push(card.id.clone());
        board.sequence = vec![todo.id.clone(), done.id.clone()];

        let mut store = StateStore::new(SessionInfo::new("alice", "en"));
        store.apply(
            &PatchBatch::new()
                .with(PatchEntry::create_board(&board))
                .with(PatchEntry::create_column(&todo))
                .with(PatchEntry::create_column(&done))
                .with(PatchEntry::create_card(&card))
                .with(PatchEntry::create_capabilities("alice".into(), capabilities)),
        );
        Fixture {
            store,
            todo,
            done,
            card,
        }
    }

    fn view(f: &Fixture) -> CardView {
        CardView::new(f.card.id.clone(), &f.store, Arc::new(FixedClock::at_secs(NOW)))
    }

    /// Apply a batch and deliver its events to the view
    fn deliver(view: &mut CardView, store: &mut StateStore, batch: PatchBatch) -> ComponentContext {
        let mut cx = ComponentContext::new();
        for event in store.apply(&batch) {
            if view.watches().contains(&event.watch()) {
                view.notify(&event, store, &mut cx);
            }
        }
        cx
    }

    #[test]
    fn test_initial_render() {
        let f = fixture(CapabilitySet::all());
        let view = view(&f);
        let render = view.render().unwrap();
        assert_eq!(render.title, "X");
        assert_eq!(render.due.text, "in 2 days");
        assert!(!render.due.overdue);
        assert!(render.draggable);
        assert_eq!(view.redraws(), &[Redraw::Attached]);
    }

    #[test]
    fn test_only_present_fields_redraw() {
        let mut f = fixture(CapabilitySet::all());
        let mut view = view(&f);

        let mut fields = CardFields::new(f.card.id.clone()).with_completed(true);
        fields.title = Some("X".into());
        deliver(
            &mut view,
            &mut f.store,
            PatchBatch::new().with(PatchEntry::update_card(fields)),
        );

        assert_eq!(
            view.redraws(),
            &[Redraw::Attached, Redraw::Completion { completed: true }]
        );
        let render = view.render().unwrap();
        assert_eq!(render.due.text, "in 2 days");
        assert_eq!(render.description, "");
    }

    #[test]
    fn test_due_cleared_and_past() {
        let mut f = fixture(CapabilitySet::all());
        let mut view = view(&f);

        let mut past = CardFields::new(f.card.id.clone());
        past.due = Some(Some(NOW - 2 * 3_600));
        deliver(&mut view, &mut f.store, PatchBatch::new().with(PatchEntry::update_card(past)));
        let due = &view.render().unwrap().due;
        assert_eq!(due.text, "2 hours ago");
        assert!(due.overdue);

        let mut cleared = CardFields::new(f.card.id.clone());
        cleared.due = Some(None);
        deliver(&mut view, &mut f.store, PatchBatch::new().with(PatchEntry::update_card(cleared)));
        assert_eq!(view.render().unwrap().due, DueRender::default());
    }

    #[test]
    fn test_reparent_on_cross_column_move() {
        let mut f = fixture(CapabilitySet::all());
        let mut view = view(&f);

        deliver(
            &mut view,
            &mut f.store,
            PatchBatch::new()
                .with(PatchEntry::update_column(
                    ColumnFields::new(f.todo.id.clone()).with_sequence(vec![]),
                ))
                .with(PatchEntry::update_column(
                    ColumnFields::new(f.done.id.clone()).with_sequence(vec![f.card.id.clone()]),
                ))
                .with(PatchEntry::update_card(
                    CardFields::new(f.card.id.clone()).with_column(f.done.id.clone()),
                )),
        );

        assert_eq!(
            view.redraws().last(),
            Some(&Redraw::Reparent {
                column_id: f.done.id.clone()
            })
        );
    }

    #[test]
    fn test_draggable_follows_assignees() {
        let mut f = fixture(CapabilitySet::none().with(Capability::MoveAssignedCards));
        let mut view = view(&f);
        assert!(!view.is_draggable());
        assert!(view.drag_data().is_none());

        deliver(
            &mut view,
            &mut f.store,
            PatchBatch::new().with(PatchEntry::update_card(
                CardFields::new(f.card.id.clone()).with_assignees(vec!["alice".into()]),
            )),
        );
        assert!(view.is_draggable());
        assert_eq!(
            &view.redraws()[1..],
            &[
                Redraw::AssigneeAdded {
                    user: "alice".into()
                },
                Redraw::Draggable { draggable: true },
            ]
        );

        deliver(
            &mut view,
            &mut f.store,
            PatchBatch::new().with(PatchEntry::update_card(
                CardFields::new(f.card.id.clone()).with_assignees(vec![]),
            )),
        );
        assert!(!view.is_draggable());
    }

    #[test]
    fn test_draggable_follows_capabilities() {
        let mut f = fixture(CapabilitySet::none());
        let mut view = view(&f);
        assert!(!view.is_draggable());

        deliver(
            &mut view,
            &mut f.store,
            PatchBatch::new().with(PatchEntry::create_capabilities(
                "alice".into(),
                CapabilitySet::none().with(Capability::MoveAllCards),
            )),
        );
        assert!(view.is_draggable());
        assert_eq!(view.drag_data(), Some(DropData::card(&f.card.id)));
    }

    #[test]
    fn test_drop_dispatches_move_after_self() {
        let f = fixture(CapabilitySet::all());
        let mut view = view(&f);
        let mut cx = ComponentContext::new();

        assert!(!view.on_drop(&DropData::card(&f.card.id), &mut cx));
        let column = DropData {
            kind: "column".into(),
            id: "c9".into(),
        };
        assert!(!view.on_drop(&column, &mut cx));
        assert!(view.on_drop(&DropData::card(&"k2".into()), &mut cx));

        let (intents, destroyed) = cx.into_parts();
        assert!(!destroyed);
        assert_eq!(
            intents,
            vec![Intent::MoveCard {
                id: "k2".into(),
                column_id: f.todo.id.clone(),
                anchor: Anchor::After(f.card.id.clone()),
            }]
        );
        // Nothing moves until the batch comes back
        assert_eq!(view.render().unwrap().column_id, f.todo.id);
    }

    #[test]
    fn test_delete_detaches() {
        let mut f = fixture(CapabilitySet::all());
        let mut view = view(&f);

        let cx = deliver(
            &mut view,
            &mut f.store,
            PatchBatch::new()
                .with(PatchEntry::update_column(
                    ColumnFields::new(f.todo.id.clone()).with_sequence(vec![]),
                ))
                .with(PatchEntry::delete_card(f.card.id.clone())),
        );

        assert!(cx.is_destroyed());
        assert!(!view.is_attached());
        assert_eq!(view.redraws().last(), Some(&Redraw::Detached));
        assert_eq!(view.action(CardAction::Complete), ActionOutcome::Ignored);
    }

    #[test]
    fn test_discussion_redraw() {
        let mut f = fixture(CapabilitySet::all());
        let mut view = view(&f);
        let message = Message::new(f.card.id.clone(), "alice".into(), "hi");

        deliver(
            &mut view,
            &mut f.store,
            PatchBatch::new()
                .with(PatchEntry::update_card(
                    CardFields::new(f.card.id.clone()).with_discussion(vec![message.id.clone()]),
                ))
                .with(PatchEntry::create_message(&message)),
        );

        assert_eq!(view.render().unwrap().discussion, vec![message.id.clone()]);
        assert_eq!(
            view.redraws().last(),
            Some(&Redraw::Discussion {
                messages: vec![message.id],
                loading: false
            })
        );
    }

    #[test]
    fn test_actions() {
        let f = fixture(CapabilitySet::all());
        let view = view(&f);
        let id = f.card.id.clone();

        assert_eq!(
            view.action(CardAction::ToggleComplete),
            ActionOutcome::Dispatch(Intent::CompleteCard { id: id.clone() })
        );
        assert_eq!(
            view.action(CardAction::Delete),
            ActionOutcome::Confirm(Intent::DeleteCard { id: id.clone() })
        );
        assert_eq!(
            view.action(CardAction::DeleteMessage("m1".into())),
            ActionOutcome::Confirm(Intent::DeleteMessage { id: "m1".into() })
        );
        assert_eq!(
            view.action(CardAction::SendMessage("   ".into())),
            ActionOutcome::Ignored
        );
        assert_eq!(
            view.action(CardAction::AddAfter("Next".into())),
            ActionOutcome::Dispatch(Intent::AddCard {
                column_id: f.card.column_id.clone(),
                anchor: Anchor::After(id.clone()),
                title: "Next".into(),
            })
        );
        assert_eq!(
            view.action(CardAction::AddAfter(" ".into())),
            ActionOutcome::Ignored
        );
        assert_eq!(
            view.action(CardAction::SetDue(None)),
            ActionOutcome::Dispatch(Intent::UpdateCard {
                id,
                title: None,
                description: None,
                due: Some(None),
            })
        );
    }
}
