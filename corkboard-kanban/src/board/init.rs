//! InitBoard command

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::patch::{PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::{Board, Column};
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Create a new board with its starting columns
#[operation(
    verb = "init",
    noun = "board",
    description = "Create a board with its default columns"
)]
#[derive(Debug, Deserialize, Serialize)]
pub struct InitBoard {
    /// Board name
    pub name: String,
    /// Column titles; the configured defaults when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl InitBoard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: None,
        }
    }

    /// Use these column titles instead of the configured defaults
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session.require(Capability::ManageColumns)?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(KanbanError::invalid_value("name", "board name cannot be empty"));
        }

        let ctx = session.ctx();
        if ctx.is_initialized() {
            return Err(KanbanError::AlreadyExists {
                path: ctx.root().to_path_buf(),
            });
        }

        let titles = match &self.columns {
            Some(titles) => titles.clone(),
            None => ctx.config().default_columns.clone(),
        };
        if titles.iter().any(|t| t.trim().is_empty()) {
            return Err(KanbanError::invalid_value("columns", "column title cannot be empty"));
        }

        let mut board = Board::new(name);
        let columns: Vec<Column> = titles
            .iter()
            .map(|title| Column::new(board.id.clone(), title.trim()))
            .collect();
        board.sequence = columns.iter().map(|c| c.id.clone()).collect();

        ctx.create_directories().await?;
        let mut changes = ctx.changes();
        for column in &columns {
            changes.write_column(column)?;
        }
        changes.write_board(&board)?;
        changes.commit().await?;

        debug!(board = %board.id, columns = columns.len(), "initialized board");

        let mut batch = PatchBatch::new().with(PatchEntry::create_board(&board));
        batch.extend(columns.iter().map(PatchEntry::create_column));
        Ok(batch)
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for InitBoard {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
