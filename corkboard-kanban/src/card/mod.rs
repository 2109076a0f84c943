//! Card commands

mod add;
mod assign;
mod complete;
mod delete;
mod mv;
mod update;

pub use add::AddCard;
pub use assign::{AssignUser, UnassignUser};
pub use complete::{CompleteCard, UncompleteCard};
pub use delete::DeleteCard;
pub use mv::MoveCard;
pub use update::UpdateCard;

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::order::Anchor;
use crate::types::{CardId, Column};

/// Reject anchors that are gone, sit in another column, or equal the card
/// being placed
async fn check_anchor(
    ctx: &KanbanContext,
    column: &Column,
    moving: Option<&CardId>,
    anchor: &Anchor<CardId>,
) -> Result<()> {
    let Anchor::After(after) = anchor else {
        return Ok(());
    };
    if moving == Some(after) {
        return Err(KanbanError::invalid_anchor(
            after,
            "a card cannot be placed after itself",
        ));
    }
    if column.contains(after) {
        return Ok(());
    }
    // A vanished anchor is NotFound, one living elsewhere is invalid
    let card = ctx.read_card(after).await?;
    Err(KanbanError::invalid_anchor(
        after,
        format!("card is in column {}, not {}", card.column_id, column.id),
    ))
}

fn check_unlocked(column: &Column) -> Result<()> {
    if column.locked {
        Err(KanbanError::ColumnLocked {
            id: column.id.to_string(),
        })
    } else {
        Ok(())
    }
}
