//! GetDiscussion command

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::patch::{CardFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::CardId;
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};

/// Fetch a card's discussion: the card's message order, then each message
#[operation(
    verb = "get",
    noun = "discussion",
    description = "Get the messages of a card's discussion"
)]
#[derive(Debug, Deserialize, Serialize)]
pub struct GetDiscussion {
    pub card_id: CardId,
}

impl GetDiscussion {
    pub fn new(card_id: impl Into<CardId>) -> Self {
        Self {
            card_id: card_id.into(),
        }
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session.require(Capability::View)?;

        let ctx = session.ctx();
        let card = ctx.read_card(&self.card_id).await?;

        let mut batch = PatchBatch::new().with(PatchEntry::update_card(
            CardFields::new(card.id.clone()).with_discussion(card.discussion.clone()),
        ));
        for id in &card.discussion {
            let message = ctx.read_message(id).await?;
            batch.push(PatchEntry::create_message(&message));
        }
        Ok(batch)
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for GetDiscussion {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        ExecutionResult::unlogged(self.run(session).await)
    }
}
