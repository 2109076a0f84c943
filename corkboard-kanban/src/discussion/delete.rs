//! DeleteMessage command

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::order;
use crate::patch::{CardFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::MessageId;
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Delete a discussion message. Authors may delete their own messages;
/// anyone else needs `manageallcards`.
#[operation(
    verb = "delete",
    noun = "message",
    description = "Delete a discussion message"
)]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteMessage {
    pub id: MessageId,
}

impl DeleteMessage {
    pub fn new(id: impl Into<MessageId>) -> Self {
        Self { id: id.into() }
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        let ctx = session.ctx();
        let message = ctx.read_message(&self.id).await?;
        if &message.author != session.actor() {
            session.require(Capability::ManageAllCards)?;
        }

        let mut card = ctx.read_card(&message.card_id).await?;
        card.discussion = order::remove(&card.discussion, &message.id);

        let mut changes = ctx.changes();
        changes.write_card(&card)?;
        changes.delete_message(&message.id);
        changes.commit().await?;

        debug!(card = %card.id, message = %message.id, "deleted message");

        Ok(PatchBatch::new()
            .with(PatchEntry::update_card(
                CardFields::new(card.id.clone()).with_discussion(card.discussion),
            ))
            .with(PatchEntry::delete_message(message.id, card.id)))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for DeleteMessage {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
