//! Operation processor: locking and activity logging around execution

use crate::error::{KanbanError, Result};
use crate::session::KanbanSession;
use corkboard_operations::{async_trait, Execute, OperationProcessor};
use tracing::{debug, warn};

/// Runs operations under the board lock and appends their log entries,
/// attributed to the session's actor, to the activity log
#[derive(Debug, Clone, Default)]
pub struct KanbanOperationProcessor;

impl KanbanOperationProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OperationProcessor<KanbanSession, KanbanError> for KanbanOperationProcessor {
    async fn process<O>(&self, operation: &O, session: &KanbanSession) -> Result<O::Output>
    where
        O: Execute<KanbanSession, KanbanError> + 'static,
    {
        let ctx = session.ctx();
        let _lock = ctx.lock().await?;

        let (result, log_entry) = operation.execute(session).await.split();

        match &result {
            Ok(_) => debug!(op = %operation.op_string(), actor = %session.actor(), "operation applied"),
            Err(e) => debug!(op = %operation.op_string(), actor = %session.actor(), error = %e, "operation failed"),
        }

        if let Some(entry) = log_entry {
            if ctx.config().activity_log {
                let entry = entry.with_actor(session.actor().as_str());
                if let Err(e) = ctx.append_activity(&entry).await {
                    warn!(op = %entry.op, error = %e, "failed to append activity log");
                }
            }
        }

        result
    }
}
