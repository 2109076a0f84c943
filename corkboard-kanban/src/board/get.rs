//! GetBoard command

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::patch::{PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};

/// Snapshot the whole board as a create-only batch
///
/// The batch is what a client applies to an empty store to build its
/// initial mirror: board, columns in board order, cards in column order,
/// registered users, then the actor's capabilities.
#[operation(
    verb = "get",
    noun = "board",
    description = "Get the board snapshot for the acting user"
)]
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GetBoard {}

impl GetBoard {
    pub fn new() -> Self {
        Self {}
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        session.require(Capability::View)?;

        let ctx = session.ctx();
        let board = ctx.read_board().await?;
        let columns = ctx.read_columns(&board).await?;

        let mut batch = PatchBatch::new().with(PatchEntry::create_board(&board));
        batch.extend(columns.iter().map(PatchEntry::create_column));
        for column in &columns {
            let cards = ctx.read_cards(column).await?;
            batch.extend(cards.iter().map(PatchEntry::create_card));
        }
        let users = ctx.read_all_users().await?;
        batch.extend(users.iter().map(PatchEntry::create_user));
        batch.push(PatchEntry::create_capabilities(
            session.actor().clone(),
            session.capabilities().clone(),
        ));

        Ok(batch)
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for GetBoard {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        ExecutionResult::unlogged(self.run(session).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilitySet;
    use crate::card::AddCard;
    use crate::patch::{Action, Collection};
    use crate::test_support::setup;
    use crate::types::User;

    #[tokio::test]
    async fn test_snapshot_order() {
        let (_temp, session) = setup().await;
        let board = session.ctx().read_board().await.unwrap();
        AddCard::new(board.sequence[0].clone(), "First")
            .execute(&session)
            .await
            .into_result()
            .unwrap();
        session
            .ctx()
            .write_user(&User::new("admin", "Admin"))
            .await
            .unwrap();

        let batch = GetBoard::new().execute(&session).await.into_result().unwrap();

        let collections: Vec<_> = batch.iter().map(|e| e.collection()).collect();
        assert_eq!(
            collections,
            vec![
                Collection::Board,
                Collection::Columns,
                Collection::Columns,
                Collection::Columns,
                Collection::Cards,
                Collection::Users,
                Collection::Capabilities,
            ]
        );
        assert!(batch.iter().all(|e| e.action() == Action::Create));
    }

    #[tokio::test]
    async fn test_get_board_is_unlogged() {
        let (_temp, session) = setup().await;
        let result = GetBoard::new().execute(&session).await;
        assert!(!result.should_log());
    }

    #[tokio::test]
    async fn test_get_board_requires_view() {
        let (_temp, session) = setup().await;
        let guest = KanbanSession::new(session.ctx().clone(), "guest", CapabilitySet::none());

        let result = GetBoard::new().execute(&guest).await.into_result();
        assert!(matches!(result, Err(KanbanError::PermissionDenied { .. })));
    }
}
