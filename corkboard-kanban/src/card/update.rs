//! UpdateCard command

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::patch::{CardFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::{Attachment, CardId};
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Update a card's editable fields
///
/// Only the fields that are set are changed, and only those are carried in
/// the emitted patch.
#[operation(verb = "update", noun = "card", description = "Update a card's fields")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateCard {
    /// The card to update
    pub id: CardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    /// `Some(None)` clears the due date
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::patch::present"
    )]
    pub due: Option<Option<i64>>,
}

impl UpdateCard {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            attachments: None,
            due: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = Some(attachments);
        self
    }

    pub fn with_due(mut self, due: i64) -> Self {
        self.due = Some(Some(due));
        self
    }

    pub fn clear_due(mut self) -> Self {
        self.due = Some(None);
        self
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session
            .require_card(
                &self.id,
                Capability::ManageAllCards,
                Capability::ManageAssignedCards,
            )
            .await?;

        let mut fields = CardFields::new(self.id.clone());
        if let Some(title) = &self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(KanbanError::invalid_value("title", "card title cannot be empty"));
            }
            fields.title = Some(title.to_string());
        }
        fields.description = self.description.clone();
        fields.attachments = self.attachments.clone();
        if let Some(due) = self.due {
            if matches!(due, Some(due) if due < 0) {
                return Err(KanbanError::invalid_value("due", "due date cannot be negative"));
            }
            // Zero means no due date
            fields.due = Some(due.filter(|d| *d > 0));
        }
        if fields.is_empty() {
            return Err(KanbanError::missing_field(
                "title, description, attachments or due",
            ));
        }

        let ctx = session.ctx();
        let mut card = ctx.read_card(&self.id).await?;
        fields.apply_to(&mut card);
        ctx.write_card(&card).await?;

        debug!(card = %card.id, "updated card");

        Ok(PatchBatch::new().with(PatchEntry::update_card(fields)))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for UpdateCard {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
