//! KanbanSession - the acting user's view of a board
//!
//! Every operation executes against a session: storage plus the actor and
//! the capabilities the permission collaborator granted them.

use crate::capability::{Capability, CapabilityProvider, CapabilitySet};
use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::patch::PatchBatch;
use crate::types::{Card, CardId, UserId};
use corkboard_operations::{ExecutionResult, Operation};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

/// Storage, actor and capabilities for one acting user
#[derive(Debug, Clone)]
pub struct KanbanSession {
    ctx: KanbanContext,
    actor: UserId,
    capabilities: CapabilitySet,
}

impl KanbanSession {
    /// Create a session with an explicit capability set
    pub fn new(ctx: KanbanContext, actor: impl Into<UserId>, capabilities: CapabilitySet) -> Self {
        Self {
            ctx,
            actor: actor.into(),
            capabilities,
        }
    }

    /// Open a session on an existing board, asking the provider for the
    /// actor's capabilities on it
    pub async fn open(
        ctx: KanbanContext,
        actor: impl Into<UserId>,
        provider: &dyn CapabilityProvider,
    ) -> Result<Self> {
        let actor = actor.into();
        let board = ctx.read_board().await?;
        let capabilities = provider.capabilities(&actor, &board.id);
        Ok(Self::new(ctx, actor, capabilities))
    }

    pub fn ctx(&self) -> &KanbanContext {
        &self.ctx
    }

    pub fn actor(&self) -> &UserId {
        &self.actor
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Fail with `PermissionDenied` unless the actor holds `capability`
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.capabilities.has(capability) {
            Ok(())
        } else {
            Err(KanbanError::permission_denied(capability, &self.actor))
        }
    }

    /// Check a card-scoped permission: `all` grants access to any card,
    /// `assigned` only to cards the actor is assigned to.
    ///
    /// Loads the card only when `assigned` is the deciding capability.
    pub async fn require_card(
        &self,
        id: &CardId,
        all: Capability,
        assigned: Capability,
    ) -> Result<()> {
        if self.capabilities.has(all) {
            return Ok(());
        }
        if !self.capabilities.has(assigned) {
            return Err(KanbanError::permission_denied(all, &self.actor));
        }
        let card = self.ctx.read_card(id).await?;
        if self.is_assigned(&card) {
            Ok(())
        } else {
            Err(KanbanError::permission_denied(all, &self.actor))
        }
    }

    /// True if the actor is among the card's assignees
    pub fn is_assigned(&self, card: &Card) -> bool {
        card.is_assigned(&self.actor)
    }

    /// Wrap a mutating operation's outcome with its log entry
    pub(crate) fn logged<O>(
        &self,
        op: &O,
        started: Instant,
        result: Result<PatchBatch>,
    ) -> ExecutionResult<PatchBatch, KanbanError>
    where
        O: Operation + Serialize,
    {
        let input = serde_json::to_value(op).unwrap_or(Value::Null);
        ExecutionResult::logged(op.op_string(), input, started, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::StaticCapabilities;
    use crate::types::{Board, ColumnId};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_asks_provider() {
        let temp = TempDir::new().unwrap();
        let ctx = KanbanContext::new(temp.path());
        ctx.write_board(&Board::new("B")).await.unwrap();

        let provider = StaticCapabilities::new(CapabilitySet::none().with(Capability::View));
        let session = KanbanSession::open(ctx, "guest", &provider).await.unwrap();

        assert!(session.require(Capability::View).is_ok());
        assert!(matches!(
            session.require(Capability::AddCard),
            Err(KanbanError::PermissionDenied {
                capability: Capability::AddCard,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_require_card_assigned() {
        let temp = TempDir::new().unwrap();
        let ctx = KanbanContext::new(temp.path());
        let mut mine = Card::new(ColumnId::from("c"), "mine");
        mine.assign(UserId::from("u"));
        let theirs = Card::new(ColumnId::from("c"), "theirs");
        ctx.write_card(&mine).await.unwrap();
        ctx.write_card(&theirs).await.unwrap();

        let session = KanbanSession::new(
            ctx,
            "u",
            CapabilitySet::none().with(Capability::MoveAssignedCards),
        );

        assert!(session
            .require_card(&mine.id, Capability::MoveAllCards, Capability::MoveAssignedCards)
            .await
            .is_ok());
        assert!(matches!(
            session
                .require_card(&theirs.id, Capability::MoveAllCards, Capability::MoveAssignedCards)
                .await,
            Err(KanbanError::PermissionDenied { .. })
        ));
        assert!(matches!(
            session
                .require_card(&mine.id, Capability::ManageAllCards, Capability::ManageAssignedCards)
                .await,
            Err(KanbanError::PermissionDenied { .. })
        ));
    }
}
