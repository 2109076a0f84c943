//! StateStore - the client-held mirror of the board
//!
//! The mirror changes only through [`StateStore::apply`]. A batch is merged
//! in full before any [`Event`] is handed out, so watchers never see a card
//! pointing at a column whose sequence has not caught up yet.

use crate::component::Event;
use corkboard_kanban::patch::{Action, Collection, PatchBatch, PatchEntry};
use corkboard_kanban::types::{
    Board, BoardId, Card, CardId, Column, ColumnId, Message, MessageId, User, UserId,
};
use corkboard_kanban::CapabilitySet;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Who is looking at which board, in which language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub board_id: Option<BoardId>,
    pub user_id: UserId,
    pub lang: String,
}

impl SessionInfo {
    pub fn new(user_id: impl Into<UserId>, lang: impl Into<String>) -> Self {
        Self {
            board_id: None,
            user_id: user_id.into(),
            lang: lang.into(),
        }
    }
}

/// Mirror of the authoritative entities, one map per collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateStore {
    session: SessionInfo,
    board: Option<Board>,
    columns: BTreeMap<ColumnId, Column>,
    cards: BTreeMap<CardId, Card>,
    discussions: BTreeMap<MessageId, Message>,
    users: BTreeMap<UserId, User>,
    capabilities: BTreeMap<UserId, CapabilitySet>,
    /// Cards with a discussion refresh in flight; view state, not mirrored
    #[serde(skip)]
    loading: BTreeSet<CardId>,
}

impl StateStore {
    pub fn new(session: SessionInfo) -> Self {
        Self {
            session,
            ..Default::default()
        }
    }

    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.discussions.get(id)
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// Capabilities mirrored for a user; none if the server sent nothing
    pub fn capabilities(&self, user: &UserId) -> CapabilitySet {
        self.capabilities.get(user).cloned().unwrap_or_default()
    }

    /// Capabilities of the acting user
    pub fn actor_capabilities(&self) -> CapabilitySet {
        self.capabilities(&self.session.user_id)
    }

    /// Columns in board order
    pub fn ordered_columns(&self) -> Vec<&Column> {
        self.board
            .iter()
            .flat_map(|board| board.sequence.iter())
            .filter_map(|id| self.columns.get(id))
            .collect()
    }

    /// Cards of a column in sequence order
    pub fn column_cards(&self, id: &ColumnId) -> Vec<&Card> {
        self.columns
            .get(id)
            .map(|column| {
                column
                    .sequence
                    .iter()
                    .filter_map(|card| self.cards.get(card))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Messages of a card's discussion in sequence order
    pub fn discussion(&self, card: &CardId) -> Vec<&Message> {
        self.cards
            .get(card)
            .map(|card| {
                card.discussion
                    .iter()
                    .filter_map(|id| self.discussions.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_discussion_loading(&self, card: &CardId) -> bool {
        self.loading.contains(card)
    }

    /// Mark a card's discussion refresh as in flight or settled. Returns
    /// false if nothing changed.
    pub fn set_discussion_loading(&mut self, card: &CardId, loading: bool) -> bool {
        if loading {
            self.loading.insert(card.clone())
        } else {
            self.loading.remove(card)
        }
    }

    /// Merge a whole batch, in order, and return one event per entry for
    /// the caller to deliver once merging is done
    pub fn apply(&mut self, batch: &PatchBatch) -> Vec<Event> {
        let mut events = Vec::with_capacity(batch.len());
        for entry in batch {
            self.merge(entry);
            events.push(Event::from_entry(entry));
        }
        events
    }

    /// Only creates insert. An update for an id the mirror no longer holds
    /// is dropped, so a late response cannot resurrect a deleted entity.
    fn merge(&mut self, entry: &PatchEntry) {
        match entry {
            PatchEntry::Board { action, fields } => match action {
                Action::Delete => self.board = None,
                Action::Create => {
                    fields.apply_to(self.board.get_or_insert_with(Board::default));
                    if self.session.board_id.is_none() {
                        self.session.board_id = Some(fields.id.clone());
                    }
                }
                Action::Update => {
                    if let Some(board) = self.board.as_mut() {
                        fields.apply_to(board);
                    }
                }
            },
            PatchEntry::Columns { action, fields } => match action {
                Action::Delete => {
                    self.columns.remove(&fields.id);
                }
                Action::Create => {
                    fields.apply_to(self.columns.entry(fields.id.clone()).or_default());
                }
                Action::Update => {
                    if let Some(existing) = self.columns.get_mut(&fields.id) {
                        fields.apply_to(existing);
                    }
                }
            },
            PatchEntry::Cards { action, fields } => match action {
                Action::Delete => {
                    self.cards.remove(&fields.id);
                    self.discussions.retain(|_, message| message.card_id != fields.id);
                    self.loading.remove(&fields.id);
                }
                Action::Create => {
                    fields.apply_to(self.cards.entry(fields.id.clone()).or_default());
                }
                Action::Update => {
                    if let Some(existing) = self.cards.get_mut(&fields.id) {
                        fields.apply_to(existing);
                    }
                }
            },
            PatchEntry::Discussions { action, fields } => match action {
                Action::Delete => {
                    self.discussions.remove(&fields.id);
                }
                Action::Create => {
                    fields.apply_to(self.discussions.entry(fields.id.clone()).or_default());
                }
                Action::Update => {
                    if let Some(existing) = self.discussions.get_mut(&fields.id) {
                        fields.apply_to(existing);
                    }
                }
            },
            PatchEntry::Users { action, fields } => match action {
                Action::Delete => {
                    self.users.remove(&fields.id);
                }
                Action::Create => {
                    fields.apply_to(self.users.entry(fields.id.clone()).or_default());
                }
                Action::Update => {
                    if let Some(existing) = self.users.get_mut(&fields.id) {
                        fields.apply_to(existing);
                    }
                }
            },
            PatchEntry::Capabilities { action, fields } => match action {
                Action::Delete => {
                    self.capabilities.remove(&fields.id);
                }
                Action::Create => {
                    fields.apply_to(self.capabilities.entry(fields.id.clone()).or_default());
                }
                Action::Update => {
                    if let Some(existing) = self.capabilities.get_mut(&fields.id) {
                        fields.apply_to(existing);
                    }
                }
            },
        }
    }

    /// Count of mirrored entities in a collection
    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Board => usize::from(self.board.is_some()),
            Collection::Columns => self.columns.len(),
            Collection::Cards => self.cards.len(),
            Collection::Discussions => self.discussions.len(),
            Collection::Users => self.users.len(),
            Collection::Capabilities => self.capabilities.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corkboard_kanban::patch::{CardFields, ColumnFields};
    use corkboard_kanban::Capability;

    fn seeded() -> (StateStore, Board, Column, Column, Card) {
        let mut board = Board::new("B");
        let mut todo = Column::new(board.id.clone(), "Todo");
        let done = Column::new(board.id.clone(), "Done");
        let card = Card::new(todo.id.clone(), "X");
        todo.sequence.push(card.id.clone());
        board.sequence = vec![todo.id.clone(), done.id.clone()];

        let mut store = StateStore::new(SessionInfo::new("alice", "en"));
        store.apply(
            &PatchBatch::new()
                .with(PatchEntry::create_board(&board))
                .with(PatchEntry::create_column(&todo))
                .with(PatchEntry::create_column(&done))
                .with(PatchEntry::create_card(&card)),
        );
        (store, board, todo, done, card)
    }

    fn move_batch(card: &Card, from: &Column, to: &Column) -> PatchBatch {
        PatchBatch::new()
            .with(PatchEntry::update_column(
                ColumnFields::new(from.id.clone()).with_sequence(vec![]),
            ))
            .with(PatchEntry::update_column(
                ColumnFields::new(to.id.clone()).with_sequence(vec![card.id.clone()]),
            ))
            .with(PatchEntry::update_card(
                CardFields::new(card.id.clone()).with_column(to.id.clone()),
            ))
    }

    #[test]
    fn test_board_create_sets_session_board() {
        let (store, board, todo, done, _) = seeded();
        assert_eq!(store.session().board_id, Some(board.id.clone()));
        let order: Vec<_> = store.ordered_columns().iter().map(|c| c.id.clone()).collect();
        assert_eq!(order, vec![todo.id, done.id]);
    }

    #[test]
    fn test_apply_returns_events_in_batch_order() {
        let (mut store, _, todo, done, card) = seeded();
        let events = store.apply(&move_batch(&card, &todo, &done));

        let keys: Vec<_> = events
            .iter()
            .map(|e| (e.collection, e.id.clone(), e.action))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Collection::Columns, todo.id.to_string(), Action::Update),
                (Collection::Columns, done.id.to_string(), Action::Update),
                (Collection::Cards, card.id.to_string(), Action::Update),
            ]
        );
        assert_eq!(store.card(&card.id).unwrap().column_id, done.id);
        assert!(store.column_cards(&todo.id).is_empty());
        assert_eq!(store.column_cards(&done.id).len(), 1);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (mut once, _, todo, done, card) = seeded();
        let batch = move_batch(&card, &todo, &done);
        once.apply(&batch);

        let mut twice = once.clone();
        twice.apply(&batch);

        assert_eq!(once, twice);
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn test_omitted_fields_are_unchanged() {
        let (mut store, _, _, _, mut card) = seeded();
        card.description = "keep me".into();
        store.apply(&PatchBatch::new().with(PatchEntry::create_card(&card)));

        store.apply(&PatchBatch::new().with(PatchEntry::update_card(
            CardFields::new(card.id.clone()).with_completed(true),
        )));

        let mirrored = store.card(&card.id).unwrap();
        assert!(mirrored.completed);
        assert_eq!(mirrored.description, "keep me");
        assert_eq!(mirrored.title, "X");
    }

    #[test]
    fn test_card_delete_drops_its_messages() {
        let (mut store, _, todo, _, card) = seeded();
        let message = Message::new(card.id.clone(), UserId::from("alice"), "hi");
        store.apply(
            &PatchBatch::new()
                .with(PatchEntry::update_card(
                    CardFields::new(card.id.clone()).with_discussion(vec![message.id.clone()]),
                ))
                .with(PatchEntry::create_message(&message)),
        );
        assert_eq!(store.discussion(&card.id).len(), 1);
        store.set_discussion_loading(&card.id, true);

        let events = store.apply(
            &PatchBatch::new()
                .with(PatchEntry::update_column(
                    ColumnFields::new(todo.id.clone()).with_sequence(vec![]),
                ))
                .with(PatchEntry::delete_card(card.id.clone())),
        );

        assert_eq!(events[1].action, Action::Delete);
        assert!(store.card(&card.id).is_none());
        assert!(store.message(&message.id).is_none());
        assert!(!store.is_discussion_loading(&card.id));
        assert!(store.column(&todo.id).unwrap().sequence.is_empty());
    }

    #[test]
    fn test_update_after_delete_is_dropped() {
        let (mut store, _, todo, _, card) = seeded();
        store.apply(
            &PatchBatch::new()
                .with(PatchEntry::update_column(
                    ColumnFields::new(todo.id.clone()).with_sequence(vec![]),
                ))
                .with(PatchEntry::delete_card(card.id.clone())),
        );

        let events = store.apply(&PatchBatch::new().with(PatchEntry::update_card(
            CardFields::new(card.id.clone()).with_discussion(vec![]),
        )));

        assert_eq!(events.len(), 1);
        assert!(store.card(&card.id).is_none());
        assert_eq!(store.len(Collection::Cards), 0);
    }

    #[test]
    fn test_discussion_events_are_keyed_by_card() {
        let (mut store, _, _, _, card) = seeded();
        let message = Message::new(card.id.clone(), UserId::from("alice"), "hi");
        let events = store.apply(&PatchBatch::new().with(PatchEntry::create_message(&message)));
        assert_eq!(events[0].collection, Collection::Discussions);
        assert_eq!(events[0].id, card.id.to_string());
    }

    #[test]
    fn test_capabilities_mirrored_verbatim() {
        let mut store = StateStore::new(SessionInfo::new("alice", "en"));
        assert!(!store.actor_capabilities().has(Capability::View));

        let set = CapabilitySet::none().with(Capability::View);
        store.apply(
            &PatchBatch::new().with(PatchEntry::create_capabilities("alice".into(), set.clone())),
        );
        assert_eq!(store.actor_capabilities(), set);
        assert_eq!(store.len(Collection::Capabilities), 1);
    }
}
