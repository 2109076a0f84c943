//! Card-level types: Card, Attachment, Message

use super::ids::{CardId, ColumnId, MessageId, UserId};
use crate::order;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file attachment reference; the file itself lives with the storage collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A card on the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Assigned users, no duplicates
    #[serde(default)]
    pub assignees: Vec<UserId>,
    #[serde(default)]
    pub completed: bool,
    /// Due date as Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<i64>,
    /// Discussion message order
    #[serde(default, with = "order::delimited")]
    pub discussion: Vec<MessageId>,
}

impl Card {
    /// Create a new card in a column
    pub fn new(column_id: ColumnId, title: impl Into<String>) -> Self {
        Self {
            id: CardId::new(),
            column_id,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Check whether the user is among the assignees
    pub fn is_assigned(&self, user: &UserId) -> bool {
        self.assignees.contains(user)
    }

    /// Add an assignee; returns false if already assigned
    pub fn assign(&mut self, user: UserId) -> bool {
        if self.is_assigned(&user) {
            return false;
        }
        self.assignees.push(user);
        true
    }

    /// Remove an assignee; returns false if not assigned
    pub fn unassign(&mut self, user: &UserId) -> bool {
        let before = self.assignees.len();
        self.assignees.retain(|u| u != user);
        before != self.assignees.len()
    }
}

/// A discussion message attached to a card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub card_id: CardId,
    pub author: UserId,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message authored now
    pub fn new(card_id: CardId, author: UserId, body: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            card_id,
            author,
            body: body.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_is_a_set() {
        let mut card = Card::new(ColumnId::from("c1"), "Write docs");
        assert!(card.assign(UserId::from("alice")));
        assert!(!card.assign(UserId::from("alice")));
        assert_eq!(card.assignees.len(), 1);
        assert!(card.is_assigned(&UserId::from("alice")));

        assert!(card.unassign(&UserId::from("alice")));
        assert!(!card.unassign(&UserId::from("alice")));
        assert!(card.assignees.is_empty());
    }

    #[test]
    fn test_card_minimal_json() {
        let json = serde_json::json!({
            "id": "k1",
            "column_id": "c1",
            "title": "Minimal"
        });
        let card: Card = serde_json::from_value(json).unwrap();
        assert_eq!(card.due, None);
        assert!(card.discussion.is_empty());
        assert!(!card.completed);
    }
}
