//! UpdateColumn command

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::patch::{ColumnFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::ColumnId;
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Rename a column or toggle its lock
#[operation(
    verb = "update",
    noun = "column",
    description = "Update a column's title or lock"
)]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateColumn {
    /// The column to update
    pub id: ColumnId,
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Lock or unlock the column against card changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl UpdateColumn {
    pub fn new(id: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            locked: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session.require(Capability::ManageColumns)?;

        if self.title.is_none() && self.locked.is_none() {
            return Err(KanbanError::missing_field("title or locked"));
        }

        let ctx = session.ctx();
        let mut column = ctx.read_column(&self.id).await?;
        let mut fields = ColumnFields::new(column.id.clone());

        if let Some(title) = &self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(KanbanError::invalid_value("title", "column title cannot be empty"));
            }
            fields = fields.with_title(title);
        }
        if let Some(locked) = self.locked {
            fields = fields.with_locked(locked);
        }

        fields.apply_to(&mut column);
        ctx.write_column(&column).await?;

        debug!(column = %column.id, locked = column.locked, "updated column");

        Ok(PatchBatch::new().with(PatchEntry::update_column(fields)))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for UpdateColumn {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
