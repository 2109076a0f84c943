//! AddCard command

use super::{check_anchor, check_unlocked};
use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::order::{self, Anchor};
use crate::patch::{ColumnFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::{Attachment, Card, CardId, ColumnId};
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Add a new card to a column
#[operation(verb = "add", noun = "card", description = "Create a card after an anchor")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddCard {
    /// Column to add the card to
    pub column_id: ColumnId,
    /// Where to place it in the column
    #[serde(default)]
    pub anchor: Anchor<CardId>,
    /// Card title (required)
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Due date as Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<i64>,
}

impl AddCard {
    /// Add a card at the head of a column
    pub fn new(column_id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            anchor: Anchor::Head,
            title: title.into(),
            description: None,
            attachments: Vec::new(),
            due: None,
        }
    }

    /// Place the card after another card of the same column
    pub fn after(mut self, card: impl Into<CardId>) -> Self {
        self.anchor = Anchor::After(card.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_due(mut self, due: i64) -> Self {
        self.due = Some(due);
        self
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session.require(Capability::AddCard)?;

        let title = self.title.trim();
        if title.is_empty() {
            return Err(KanbanError::invalid_value("title", "card title cannot be empty"));
        }
        if matches!(self.due, Some(due) if due < 0) {
            return Err(KanbanError::invalid_value("due", "due date cannot be negative"));
        }

        let ctx = session.ctx();
        let mut column = ctx.read_column(&self.column_id).await?;
        check_unlocked(&column)?;
        check_anchor(ctx, &column, None, &self.anchor).await?;

        let mut card = Card::new(column.id.clone(), title);
        card.description = self.description.clone().unwrap_or_default();
        card.attachments = self.attachments.clone();
        card.due = self.due.filter(|due| *due > 0);

        column.sequence = order::insert_after(&column.sequence, &card.id, &self.anchor);

        let mut changes = ctx.changes();
        changes.write_card(&card)?;
        changes.write_column(&column)?;
        changes.commit().await?;

        debug!(card = %card.id, column = %column.id, anchor = %self.anchor, "added card");

        Ok(PatchBatch::new()
            .with(PatchEntry::update_column(
                ColumnFields::new(column.id.clone()).with_sequence(column.sequence.clone()),
            ))
            .with(PatchEntry::create_card(&card)))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddCard {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::UpdateColumn;
    use crate::patch::{Action, Collection};
    use crate::test_support::{add_card, first_column, setup};

    #[tokio::test]
    async fn test_add_card_at_head_and_after() {
        let (_temp, session) = setup().await;
        let column = first_column(&session).await;

        let x = add_card(&session, &column, "X").await;
        let y = add_card(&session, &column, "Y").await;
        let z = AddCard::new(column.clone(), "Z")
            .after(y.clone())
            .execute(&session)
            .await
            .into_result()
            .unwrap();
        let z = CardId::from(z.entries()[1].id());

        // Y was added at the head, Z right after it
        let stored = session.ctx().read_column(&column).await.unwrap();
        assert_eq!(stored.sequence, vec![y, z, x]);
    }

    #[tokio::test]
    async fn test_add_card_emits_column_then_card() {
        let (_temp, session) = setup().await;
        let column = first_column(&session).await;

        let batch = AddCard::new(column.clone(), "Write tests")
            .with_description("all of them")
            .with_due(1_900_000_000)
            .execute(&session)
            .await
            .into_result()
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.entries()[0].collection(), Collection::Columns);
        assert_eq!(batch.entries()[0].action(), Action::Update);
        assert_eq!(batch.entries()[1].collection(), Collection::Cards);
        assert_eq!(batch.entries()[1].action(), Action::Create);

        let card = session
            .ctx()
            .read_card(&CardId::from(batch.entries()[1].id()))
            .await
            .unwrap();
        assert_eq!(card.description, "all of them");
        assert_eq!(card.due, Some(1_900_000_000));
        assert_eq!(card.column_id, column);
    }

    #[tokio::test]
    async fn test_add_card_anchor_in_other_column() {
        let (_temp, session) = setup().await;
        let board = session.ctx().read_board().await.unwrap();
        let elsewhere = add_card(&session, &board.sequence[1], "Elsewhere").await;

        let result = AddCard::new(board.sequence[0].clone(), "X")
            .after(elsewhere)
            .execute(&session)
            .await
            .into_result();
        assert!(matches!(result, Err(KanbanError::InvalidAnchor { .. })));

        let result = AddCard::new(board.sequence[0].clone(), "X")
            .after("deleted-card")
            .execute(&session)
            .await
            .into_result();
        assert!(matches!(result, Err(KanbanError::CardNotFound { .. })));
    }

    #[tokio::test]
    async fn test_add_card_to_locked_column() {
        let (_temp, session) = setup().await;
        let column = first_column(&session).await;
        UpdateColumn::new(column.clone())
            .with_locked(true)
            .execute(&session)
            .await
            .into_result()
            .unwrap();

        let result = AddCard::new(column.clone(), "X")
            .execute(&session)
            .await
            .into_result();
        assert!(matches!(result, Err(KanbanError::ColumnLocked { .. })));
        assert!(session.ctx().read_column(&column).await.unwrap().sequence.is_empty());
    }

    #[tokio::test]
    async fn test_add_card_unknown_column() {
        let (_temp, session) = setup().await;
        let result = AddCard::new("nope", "X").execute(&session).await.into_result();
        assert!(matches!(result, Err(KanbanError::ColumnNotFound { .. })));
    }
}
