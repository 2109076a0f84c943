//! Patch batches: the wire contract between the board engine and clients
//!
//! A batch is an ordered list of absolute-state entries. Each entry targets
//! one collection and one id. Every field carried is the full new value
//! (sequences included), so applying a batch twice equals applying it once.
//!
//! Field structs make "omitted" and "cleared" distinct by type: `None` means
//! the field is unchanged, `Some(empty)` means it was explicitly emptied.

use crate::capability::CapabilitySet;
use crate::order;
use crate::types::{
    Attachment, Board, BoardId, Card, CardId, Column, ColumnId, Message, MessageId, User, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// What an entry does to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        })
    }
}

/// The mirrored collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Board,
    Columns,
    Cards,
    Discussions,
    Users,
    Capabilities,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Board => "board",
            Self::Columns => "columns",
            Self::Cards => "cards",
            Self::Discussions => "discussions",
            Self::Users => "users",
            Self::Capabilities => "capabilities",
        })
    }
}

/// Deserialize a present field (even `null`) as `Some`, so that an explicit
/// null can be told apart from an omitted field
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Board fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFields {
    pub id: BoardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "order::delimited_opt")]
    pub sequence: Option<Vec<ColumnId>>,
}

impl BoardFields {
    pub fn new(id: BoardId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_sequence(mut self, sequence: Vec<ColumnId>) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Merge the present fields into a board
    pub fn apply_to(&self, board: &mut Board) {
        board.id = self.id.clone();
        if let Some(name) = &self.name {
            board.name = name.clone();
        }
        if let Some(sequence) = &self.sequence {
            board.sequence = sequence.clone();
        }
    }
}

impl From<&Board> for BoardFields {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id.clone(),
            name: Some(board.name.clone()),
            sequence: Some(board.sequence.clone()),
        }
    }
}

/// Column fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFields {
    pub id: ColumnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "order::delimited_opt")]
    pub sequence: Option<Vec<CardId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl ColumnFields {
    pub fn new(id: ColumnId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_sequence(mut self, sequence: Vec<CardId>) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    /// Merge the present fields into a column
    pub fn apply_to(&self, column: &mut Column) {
        column.id = self.id.clone();
        if let Some(board_id) = &self.board_id {
            column.board_id = board_id.clone();
        }
        if let Some(title) = &self.title {
            column.title = title.clone();
        }
        if let Some(sequence) = &self.sequence {
            column.sequence = sequence.clone();
        }
        if let Some(locked) = self.locked {
            column.locked = locked;
        }
    }
}

impl From<&Column> for ColumnFields {
    fn from(column: &Column) -> Self {
        Self {
            id: column.id.clone(),
            board_id: Some(column.board_id.clone()),
            title: Some(column.title.clone()),
            sequence: Some(column.sequence.clone()),
            locked: Some(column.locked),
        }
    }
}

/// Card fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFields {
    pub id: CardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<UserId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Omitted: unchanged. `null`: cleared. Number: Unix seconds.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub due: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "order::delimited_opt")]
    pub discussion: Option<Vec<MessageId>>,
}

impl CardFields {
    pub fn new(id: CardId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_column(mut self, column_id: ColumnId) -> Self {
        self.column_id = Some(column_id);
        self
    }

    pub fn with_assignees(mut self, assignees: Vec<UserId>) -> Self {
        self.assignees = Some(assignees);
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn with_discussion(mut self, discussion: Vec<MessageId>) -> Self {
        self.discussion = Some(discussion);
        self
    }

    /// True if no field besides the id is present
    pub fn is_empty(&self) -> bool {
        self.column_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.attachments.is_none()
            && self.assignees.is_none()
            && self.completed.is_none()
            && self.due.is_none()
            && self.discussion.is_none()
    }

    /// Merge the present fields into a card
    pub fn apply_to(&self, card: &mut Card) {
        card.id = self.id.clone();
        if let Some(column_id) = &self.column_id {
            card.column_id = column_id.clone();
        }
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(description) = &self.description {
            card.description = description.clone();
        }
        if let Some(attachments) = &self.attachments {
            card.attachments = attachments.clone();
        }
        if let Some(assignees) = &self.assignees {
            card.assignees = assignees.clone();
        }
        if let Some(completed) = self.completed {
            card.completed = completed;
        }
        if let Some(due) = self.due {
            card.due = due;
        }
        if let Some(discussion) = &self.discussion {
            card.discussion = discussion.clone();
        }
    }
}

impl From<&Card> for CardFields {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            column_id: Some(card.column_id.clone()),
            title: Some(card.title.clone()),
            description: Some(card.description.clone()),
            attachments: Some(card.attachments.clone()),
            assignees: Some(card.assignees.clone()),
            completed: Some(card.completed),
            due: Some(card.due),
            discussion: Some(card.discussion.clone()),
        }
    }
}

/// Discussion message fields; `card_id` is always carried so watchers of the
/// card's discussion can be notified
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFields {
    pub id: MessageId,
    pub card_id: CardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl MessageFields {
    pub fn new(id: MessageId, card_id: CardId) -> Self {
        Self {
            id,
            card_id,
            ..Default::default()
        }
    }

    /// Merge the present fields into a message
    pub fn apply_to(&self, message: &mut Message) {
        message.id = self.id.clone();
        message.card_id = self.card_id.clone();
        if let Some(author) = &self.author {
            message.author = author.clone();
        }
        if let Some(body) = &self.body {
            message.body = body.clone();
        }
        if let Some(timestamp) = self.timestamp {
            message.timestamp = timestamp;
        }
    }
}

impl From<&Message> for MessageFields {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            card_id: message.card_id.clone(),
            author: Some(message.author.clone()),
            body: Some(message.body.clone()),
            timestamp: Some(message.timestamp),
        }
    }
}

/// User fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserFields {
    pub fn apply_to(&self, user: &mut User) {
        user.id = self.id.clone();
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
    }
}

impl From<&User> for UserFields {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: Some(user.name.clone()),
        }
    }
}

/// Capability fields for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityFields {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilitySet>,
}

impl CapabilityFields {
    pub fn apply_to(&self, set: &mut CapabilitySet) {
        if let Some(capabilities) = &self.capabilities {
            *set = capabilities.clone();
        }
    }
}

/// One absolute-state instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "collection", rename_all = "lowercase")]
pub enum PatchEntry {
    Board { action: Action, fields: BoardFields },
    Columns { action: Action, fields: ColumnFields },
    Cards { action: Action, fields: CardFields },
    Discussions { action: Action, fields: MessageFields },
    Users { action: Action, fields: UserFields },
    Capabilities { action: Action, fields: CapabilityFields },
}

impl PatchEntry {
    /// The collection this entry targets
    pub fn collection(&self) -> Collection {
        match self {
            Self::Board { .. } => Collection::Board,
            Self::Columns { .. } => Collection::Columns,
            Self::Cards { .. } => Collection::Cards,
            Self::Discussions { .. } => Collection::Discussions,
            Self::Users { .. } => Collection::Users,
            Self::Capabilities { .. } => Collection::Capabilities,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Self::Board { action, .. }
            | Self::Columns { action, .. }
            | Self::Cards { action, .. }
            | Self::Discussions { action, .. }
            | Self::Users { action, .. }
            | Self::Capabilities { action, .. } => *action,
        }
    }

    /// Primary id of the target entity
    pub fn id(&self) -> &str {
        match self {
            Self::Board { fields, .. } => fields.id.as_str(),
            Self::Columns { fields, .. } => fields.id.as_str(),
            Self::Cards { fields, .. } => fields.id.as_str(),
            Self::Discussions { fields, .. } => fields.id.as_str(),
            Self::Users { fields, .. } => fields.id.as_str(),
            Self::Capabilities { fields, .. } => fields.id.as_str(),
        }
    }

    /// Id that watchers are notified under. Discussion messages notify the
    /// owning card's discussion; everything else its own id.
    pub fn watch_id(&self) -> &str {
        match self {
            Self::Discussions { fields, .. } => fields.card_id.as_str(),
            _ => self.id(),
        }
    }

    pub fn create_board(board: &Board) -> Self {
        Self::Board {
            action: Action::Create,
            fields: board.into(),
        }
    }

    pub fn update_board(fields: BoardFields) -> Self {
        Self::Board {
            action: Action::Update,
            fields,
        }
    }

    pub fn create_column(column: &Column) -> Self {
        Self::Columns {
            action: Action::Create,
            fields: column.into(),
        }
    }

    pub fn update_column(fields: ColumnFields) -> Self {
        Self::Columns {
            action: Action::Update,
            fields,
        }
    }

    pub fn delete_column(id: ColumnId) -> Self {
        Self::Columns {
            action: Action::Delete,
            fields: ColumnFields::new(id),
        }
    }

    pub fn create_card(card: &Card) -> Self {
        Self::Cards {
            action: Action::Create,
            fields: card.into(),
        }
    }

    pub fn update_card(fields: CardFields) -> Self {
        Self::Cards {
            action: Action::Update,
            fields,
        }
    }

    pub fn delete_card(id: CardId) -> Self {
        Self::Cards {
            action: Action::Delete,
            fields: CardFields::new(id),
        }
    }

    pub fn create_message(message: &Message) -> Self {
        Self::Discussions {
            action: Action::Create,
            fields: message.into(),
        }
    }

    pub fn delete_message(id: MessageId, card_id: CardId) -> Self {
        Self::Discussions {
            action: Action::Delete,
            fields: MessageFields::new(id, card_id),
        }
    }

    pub fn create_user(user: &User) -> Self {
        Self::Users {
            action: Action::Create,
            fields: user.into(),
        }
    }

    pub fn create_capabilities(user: UserId, capabilities: CapabilitySet) -> Self {
        Self::Capabilities {
            action: Action::Create,
            fields: CapabilityFields {
                id: user,
                capabilities: Some(capabilities),
            },
        }
    }
}

/// An ordered batch of patch entries; order is significant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchBatch(Vec<PatchEntry>);

impl PatchBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, entry: PatchEntry) {
        self.0.push(entry);
    }

    /// Builder-style append
    pub fn with(mut self, entry: PatchEntry) -> Self {
        self.push(entry);
        self
    }

    pub fn entries(&self) -> &[PatchEntry] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PatchEntry>> for PatchBatch {
    fn from(entries: Vec<PatchEntry>) -> Self {
        Self(entries)
    }
}

impl IntoIterator for PatchBatch {
    type Item = PatchEntry;
    type IntoIter = std::vec::IntoIter<PatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PatchBatch {
    type Item = &'a PatchEntry;
    type IntoIter = std::slice::Iter<'a, PatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Extend<PatchEntry> for PatchBatch {
    fn extend<I: IntoIterator<Item = PatchEntry>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
