//! Column commands

mod add;
mod delete;
mod mv;
mod update;

pub use add::AddColumn;
pub use delete::DeleteColumn;
pub use mv::MoveColumn;
pub use update::UpdateColumn;

use crate::error::{KanbanError, Result};
use crate::order::Anchor;
use crate::types::{Board, ColumnId};

/// Reject anchors that are gone or equal to the column being placed
fn check_anchor(board: &Board, moving: Option<&ColumnId>, anchor: &Anchor<ColumnId>) -> Result<()> {
    let Anchor::After(after) = anchor else {
        return Ok(());
    };
    if moving == Some(after) {
        return Err(KanbanError::invalid_anchor(
            after,
            "a column cannot be placed after itself",
        ));
    }
    if !board.contains(after) {
        return Err(KanbanError::ColumnNotFound {
            id: after.to_string(),
        });
    }
    Ok(())
}
