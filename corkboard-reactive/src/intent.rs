//! Mutation intents raised by views and consumed by a [`Dispatcher`](crate::Dispatcher)

use corkboard_kanban::types::{CardId, ColumnId, MessageId, UserId};
use corkboard_kanban::{Anchor, PatchBatch};
use serde::Serialize;

/// A request to change the board, or to apply updates that arrived
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    AddColumn {
        title: String,
        anchor: Anchor<ColumnId>,
    },
    MoveColumn {
        id: ColumnId,
        anchor: Anchor<ColumnId>,
    },
    DeleteColumn {
        id: ColumnId,
    },
    AddCard {
        column_id: ColumnId,
        anchor: Anchor<CardId>,
        title: String,
    },
    MoveCard {
        id: CardId,
        column_id: ColumnId,
        anchor: Anchor<CardId>,
    },
    DeleteCard {
        id: CardId,
    },
    /// Partial update; `None` leaves a field as it is
    UpdateCard {
        id: CardId,
        title: Option<String>,
        description: Option<String>,
        due: Option<Option<i64>>,
    },
    CompleteCard {
        id: CardId,
    },
    UncompleteCard {
        id: CardId,
    },
    /// Assign a user, the actor when `user` is absent
    AssignUser {
        id: CardId,
        user: Option<UserId>,
    },
    UnassignUser {
        id: CardId,
        user: Option<UserId>,
    },
    SendDiscussionMessage {
        card_id: CardId,
        body: String,
    },
    DeleteMessage {
        id: MessageId,
    },
    GetDiscussionUpdates {
        card_id: CardId,
    },
    /// Apply a batch that arrived without a request, e.g. pushed by the server
    ProcessUpdates {
        batch: PatchBatch,
    },
}

impl Intent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddColumn { .. } => "add_column",
            Self::MoveColumn { .. } => "move_column",
            Self::DeleteColumn { .. } => "delete_column",
            Self::AddCard { .. } => "add_card",
            Self::MoveCard { .. } => "move_card",
            Self::DeleteCard { .. } => "delete_card",
            Self::UpdateCard { .. } => "update_card",
            Self::CompleteCard { .. } => "complete_card",
            Self::UncompleteCard { .. } => "uncomplete_card",
            Self::AssignUser { .. } => "assign_user",
            Self::UnassignUser { .. } => "unassign_user",
            Self::SendDiscussionMessage { .. } => "send_discussion_message",
            Self::DeleteMessage { .. } => "delete_message",
            Self::GetDiscussionUpdates { .. } => "get_discussion_updates",
            Self::ProcessUpdates { .. } => "process_updates",
        }
    }

    /// Destructive intents need the user's confirmation before dispatch
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::DeleteColumn { .. } | Self::DeleteCard { .. } | Self::DeleteMessage { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let intent = Intent::MoveCard {
            id: "k1".into(),
            column_id: "c2".into(),
            anchor: Anchor::After("k0".into()),
        };
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["intent"], "move_card");
        assert_eq!(json["anchor"]["after"], "k0");
        assert_eq!(intent.name(), "move_card");
    }

    #[test]
    fn test_destructive() {
        assert!(Intent::DeleteCard { id: "k".into() }.is_destructive());
        assert!(Intent::DeleteMessage { id: "m".into() }.is_destructive());
        assert!(!Intent::CompleteCard { id: "k".into() }.is_destructive());
    }
}
