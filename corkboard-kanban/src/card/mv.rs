//! MoveCard command

use super::{check_anchor, check_unlocked};
use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::order::{self, Anchor};
use crate::patch::{CardFields, ColumnFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::{CardId, ColumnId};
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Move a card within its column or into another one
///
/// A move inside one column emits a single column patch. A move across
/// columns emits the source column, the target column, then the card's new
/// owning column, so the id is never in two sequences at once on a client
/// applying the batch in order.
#[operation(verb = "move", noun = "card", description = "Move a card after an anchor")]
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveCard {
    /// The card to move
    pub id: CardId,
    /// Target column
    pub column_id: ColumnId,
    /// Where to place it in the target column
    #[serde(default)]
    pub anchor: Anchor<CardId>,
}

impl MoveCard {
    /// Move a card to the head of a column
    pub fn to_column(id: impl Into<CardId>, column_id: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            column_id: column_id.into(),
            anchor: Anchor::Head,
        }
    }

    /// Place the card after another card of the target column
    pub fn after(mut self, card: impl Into<CardId>) -> Self {
        self.anchor = Anchor::After(card.into());
        self
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session
            .require_card(&self.id, Capability::MoveAllCards, Capability::MoveAssignedCards)
            .await?;

        let ctx = session.ctx();
        let mut card = ctx.read_card(&self.id).await?;
        let mut source = ctx.read_column(&card.column_id).await?;
        if !source.contains(&card.id) {
            return Err(KanbanError::conflict(format!(
                "card {} is not in the sequence of its column {}",
                card.id, source.id
            )));
        }

        if source.id == self.column_id {
            check_unlocked(&source)?;
            check_anchor(ctx, &source, Some(&card.id), &self.anchor).await?;

            source.sequence = order::insert_after(&source.sequence, &card.id, &self.anchor);
            ctx.write_column(&source).await?;

            debug!(card = %card.id, column = %source.id, anchor = %self.anchor, "reordered card");

            return Ok(PatchBatch::new().with(PatchEntry::update_column(
                ColumnFields::new(source.id.clone()).with_sequence(source.sequence),
            )));
        }

        let mut target = ctx.read_column(&self.column_id).await?;
        check_unlocked(&source)?;
        check_unlocked(&target)?;
        check_anchor(ctx, &target, Some(&card.id), &self.anchor).await?;

        source.sequence = order::remove(&source.sequence, &card.id);
        target.sequence = order::insert_after(&target.sequence, &card.id, &self.anchor);
        card.column_id = target.id.clone();

        let mut changes = ctx.changes();
        changes.write_column(&source)?;
        changes.write_column(&target)?;
        changes.write_card(&card)?;
        changes.commit().await?;

        debug!(
            card = %card.id,
            from = %source.id,
            to = %target.id,
            anchor = %self.anchor,
            "moved card"
        );

        Ok(PatchBatch::new()
            .with(PatchEntry::update_column(
                ColumnFields::new(source.id.clone()).with_sequence(source.sequence),
            ))
            .with(PatchEntry::update_column(
                ColumnFields::new(target.id.clone()).with_sequence(target.sequence),
            ))
            .with(PatchEntry::update_card(
                CardFields::new(card.id.clone()).with_column(target.id),
            )))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for MoveCard {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
