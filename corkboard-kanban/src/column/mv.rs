//! MoveColumn command

use super::check_anchor;
use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::order::{self, Anchor};
use crate::patch::{BoardFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::ColumnId;
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Reorder a column on the board
#[operation(verb = "move", noun = "column", description = "Move a column after an anchor")]
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveColumn {
    /// The column to move
    pub id: ColumnId,
    /// Where to place it
    #[serde(default)]
    pub anchor: Anchor<ColumnId>,
}

impl MoveColumn {
    /// Move a column to the head of the board
    pub fn to_head(id: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            anchor: Anchor::Head,
        }
    }

    /// Move a column after another column
    pub fn after(id: impl Into<ColumnId>, anchor: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            anchor: Anchor::After(anchor.into()),
        }
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session.require(Capability::ManageColumns)?;

        let ctx = session.ctx();
        let mut board = ctx.read_board().await?;
        if !board.contains(&self.id) {
            return Err(KanbanError::ColumnNotFound {
                id: self.id.to_string(),
            });
        }
        check_anchor(&board, Some(&self.id), &self.anchor)?;

        board.sequence = order::insert_after(&board.sequence, &self.id, &self.anchor);
        ctx.write_board(&board).await?;

        debug!(column = %self.id, anchor = %self.anchor, "moved column");

        Ok(PatchBatch::new().with(PatchEntry::update_board(
            BoardFields::new(board.id.clone()).with_sequence(board.sequence),
        )))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for MoveColumn {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
