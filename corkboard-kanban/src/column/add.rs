//! AddColumn command

use super::check_anchor;
use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::order::{self, Anchor};
use crate::patch::{BoardFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::{Column, ColumnId};
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Add a column to the board
#[operation(verb = "add", noun = "column", description = "Add a column after an anchor")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddColumn {
    /// Column title
    pub title: String,
    /// Where to place it
    #[serde(default)]
    pub anchor: Anchor<ColumnId>,
}

impl AddColumn {
    /// Add a column at the head of the board
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            anchor: Anchor::Head,
        }
    }

    /// Place the column after another column
    pub fn after(mut self, column: impl Into<ColumnId>) -> Self {
        self.anchor = Anchor::After(column.into());
        self
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session.require(Capability::ManageColumns)?;

        let title = self.title.trim();
        if title.is_empty() {
            return Err(KanbanError::invalid_value("title", "column title cannot be empty"));
        }

        let ctx = session.ctx();
        let mut board = ctx.read_board().await?;
        check_anchor(&board, None, &self.anchor)?;

        let column = Column::new(board.id.clone(), title);
        board.sequence = order::insert_after(&board.sequence, &column.id, &self.anchor);

        let mut changes = ctx.changes();
        changes.write_column(&column)?;
        changes.write_board(&board)?;
        changes.commit().await?;

        debug!(column = %column.id, anchor = %self.anchor, "added column");

        Ok(PatchBatch::new()
            .with(PatchEntry::update_board(
                BoardFields::new(board.id.clone()).with_sequence(board.sequence.clone()),
            ))
            .with(PatchEntry::create_column(&column)))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddColumn {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{Action, Collection};
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_add_column_at_head() {
        let (_temp, session) = setup().await;
        let before = session.ctx().read_board().await.unwrap().sequence;

        let batch = AddColumn::new("Triage")
            .execute(&session)
            .await
            .into_result()
            .unwrap();

        let board = session.ctx().read_board().await.unwrap();
        assert_eq!(board.sequence.len(), 4);
        assert_eq!(&board.sequence[1..], &before[..]);

        // Board sequence first, then the new column
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.entries()[0].collection(), Collection::Board);
        assert_eq!(batch.entries()[1].collection(), Collection::Columns);
        assert_eq!(batch.entries()[1].action(), Action::Create);
        assert_eq!(batch.entries()[1].id(), board.sequence[0].as_str());
    }

    #[tokio::test]
    async fn test_add_column_after_anchor() {
        let (_temp, session) = setup().await;
        let before = session.ctx().read_board().await.unwrap().sequence;

        AddColumn::new("Review")
            .after(before[1].clone())
            .execute(&session)
            .await
            .into_result()
            .unwrap();

        let board = session.ctx().read_board().await.unwrap();
        assert_eq!(board.sequence[1], before[1]);
        assert_eq!(board.sequence[3], before[2]);
        let added = session.ctx().read_column(&board.sequence[2]).await.unwrap();
        assert_eq!(added.title, "Review");
    }

    #[tokio::test]
    async fn test_add_column_missing_anchor() {
        let (_temp, session) = setup().await;

        let result = AddColumn::new("X")
            .after("gone")
            .execute(&session)
            .await
            .into_result();
        assert!(matches!(result, Err(KanbanError::ColumnNotFound { .. })));
        assert_eq!(session.ctx().read_board().await.unwrap().sequence.len(), 3);
    }

    #[tokio::test]
    async fn test_add_column_blank_title() {
        let (_temp, session) = setup().await;
        let result = AddColumn::new(" ").execute(&session).await.into_result();
        assert!(matches!(result, Err(KanbanError::InvalidValue { .. })));
    }
}
