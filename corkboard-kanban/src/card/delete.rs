//! DeleteCard command

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::order;
use crate::patch::{ColumnFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::CardId;
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Delete a card and its discussion
#[operation(verb = "delete", noun = "card", description = "Delete a card")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteCard {
    /// The card to delete
    pub id: CardId,
}

impl DeleteCard {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self { id: id.into() }
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session
            .require_card(
                &self.id,
                Capability::ManageAllCards,
                Capability::ManageAssignedCards,
            )
            .await?;

        let ctx = session.ctx();
        let card = ctx.read_card(&self.id).await?;
        let mut column = ctx.read_column(&card.column_id).await?;

        column.sequence = order::remove(&column.sequence, &card.id);
        let mut changes = ctx.changes();
        changes.write_column(&column)?;
        changes.delete_card(&card);
        changes.commit().await?;

        debug!(card = %card.id, column = %column.id, "deleted card");

        // Column first so views detach before the card leaves the mirror
        Ok(PatchBatch::new()
            .with(PatchEntry::update_column(
                ColumnFields::new(column.id.clone()).with_sequence(column.sequence),
            ))
            .with(PatchEntry::delete_card(card.id)))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for DeleteCard {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
