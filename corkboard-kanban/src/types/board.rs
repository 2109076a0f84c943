//! Board-level types: Board, Column, User

use super::ids::{BoardId, CardId, ColumnId, UserId};
use crate::order;
use serde::{Deserialize, Serialize};

/// The kanban board: a name plus the ordered column ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    /// Column display order
    #[serde(with = "order::delimited")]
    pub sequence: Vec<ColumnId>,
}

impl Board {
    /// Create a new, empty board
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
            sequence: Vec::new(),
        }
    }

    /// True if the column is part of this board's order
    pub fn contains(&self, column: &ColumnId) -> bool {
        self.sequence.contains(column)
    }
}

/// A column holding an ordered list of cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    /// Card display order
    #[serde(with = "order::delimited")]
    pub sequence: Vec<CardId>,
    /// Locked columns accept no card additions or moves
    #[serde(default)]
    pub locked: bool,
}

impl Column {
    /// Create a new, empty column on a board
    pub fn new(board_id: BoardId, title: impl Into<String>) -> Self {
        Self {
            id: ColumnId::new(),
            board_id,
            title: title.into(),
            sequence: Vec::new(),
            locked: false,
        }
    }

    /// True if the card is ordered in this column
    pub fn contains(&self, card: &CardId) -> bool {
        self.sequence.contains(card)
    }
}

/// A registered user, so assignees can be validated and displayed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_stores_sequence_as_text() {
        let mut board = Board::new("Sprint");
        board.sequence = vec![ColumnId::from("a"), ColumnId::from("b")];
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["sequence"], "a,b");

        let back: Board = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_column_defaults_unlocked() {
        let json = serde_json::json!({
            "id": "c1",
            "board_id": "b1",
            "title": "Doing",
            "sequence": ""
        });
        let column: Column = serde_json::from_value(json).unwrap();
        assert!(!column.locked);
        assert!(column.sequence.is_empty());
    }
}
