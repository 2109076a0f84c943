//! DeleteColumn command

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::order;
use crate::patch::{BoardFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::ColumnId;
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Delete a column together with its cards
#[operation(
    verb = "delete",
    noun = "column",
    description = "Delete a column and the cards in it"
)]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteColumn {
    /// The column to delete
    pub id: ColumnId,
}

impl DeleteColumn {
    pub fn new(id: impl Into<ColumnId>) -> Self {
        Self { id: id.into() }
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
        let column = ctx.read_column(&self.id).await?;
        let cards = ctx.read_cards(&column).await?;

        board.sequence = order::remove(&board.sequence, &self.id);
        let mut changes = ctx.changes();
        changes.write_board(&board)?;
        for card in &cards {
            changes.delete_card(card);
        }
        changes.delete_column(&self.id);
        changes.commit().await?;

        debug!(column = %self.id, cards = cards.len(), "deleted column");

        let mut batch = PatchBatch::new().with(PatchEntry::update_board(
            BoardFields::new(board.id.clone()).with_sequence(board.sequence),
        ));
        batch.extend(cards.iter().map(|c| PatchEntry::delete_card(c.id.clone())));
        batch.push(PatchEntry::delete_column(self.id.clone()));
        Ok(batch)
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for DeleteColumn {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
