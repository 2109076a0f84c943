//! CompleteCard / UncompleteCard commands

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::patch::{CardFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::CardId;
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

async fn set_completed(session: &KanbanSession, id: &CardId, completed: bool) -> Result<PatchBatch> {
    session
        .require_card(id, Capability::ManageAllCards, Capability::ManageAssignedCards)
        .await?;

    let ctx = session.ctx();
    let mut card = ctx.read_card(id).await?;
    card.completed = completed;
    ctx.write_card(&card).await?;

    debug!(card = %card.id, completed, "set card completion");

    Ok(PatchBatch::new().with(PatchEntry::update_card(
        CardFields::new(card.id).with_completed(completed),
    )))
}

/// Mark a card as done
#[operation(verb = "complete", noun = "card", description = "Mark a card as completed")]
#[derive(Debug, Deserialize, Serialize)]
pub struct CompleteCard {
    pub id: CardId,
}

impl CompleteCard {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for CompleteCard {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, set_completed(session, &self.id, true).await)
    }
}

/// Reopen a completed card
#[operation(
    verb = "uncomplete",
    noun = "card",
    description = "Mark a card as not completed"
)]
#[derive(Debug, Deserialize, Serialize)]
pub struct UncompleteCard {
    pub id: CardId,
}

impl UncompleteCard {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for UncompleteCard {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, set_completed(session, &self.id, false).await)
    }
}
