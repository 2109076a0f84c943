//! SendMessage command

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::order;
use crate::patch::{CardFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::{CardId, Message};
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Post a message to a card's discussion
#[operation(
    verb = "send",
    noun = "message",
    description = "Send a message to a card's discussion"
)]
#[derive(Debug, Deserialize, Serialize)]
pub struct SendMessage {
    /// The card being discussed
    pub card_id: CardId,
    /// Message text
    pub body: String,
}

impl SendMessage {
    pub fn new(card_id: impl Into<CardId>, body: impl Into<String>) -> Self {
        Self {
            card_id: card_id.into(),
            body: body.into(),
        }
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session.require(Capability::View)?;

        let body = self.body.trim();
        if body.is_empty() {
            return Err(KanbanError::invalid_value("body", "message cannot be empty"));
        }

        let ctx = session.ctx();
        let mut card = ctx.read_card(&self.card_id).await?;
        let message = Message::new(card.id.clone(), session.actor().clone(), body);
        card.discussion = order::push(&card.discussion, &message.id);

        let mut changes = ctx.changes();
        changes.write_message(&message)?;
        changes.write_card(&card)?;
        changes.commit().await?;

        debug!(card = %card.id, message = %message.id, "sent message");

        Ok(PatchBatch::new()
            .with(PatchEntry::update_card(
                CardFields::new(card.id.clone()).with_discussion(card.discussion.clone()),
            ))
            .with(PatchEntry::create_message(&message)))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for SendMessage {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
