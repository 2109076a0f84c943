//! In-process dispatch straight to the board engine

use crate::error::Result;
use crate::intent::Intent;
use crate::reactive::Dispatcher;
use crate::store::SessionInfo;
use async_trait::async_trait;
use corkboard_kanban::board::GetBoard;
use corkboard_kanban::card::{
    AddCard, AssignUser, CompleteCard, DeleteCard, MoveCard, UnassignUser, UncompleteCard,
    UpdateCard,
};
use corkboard_kanban::column::{AddColumn, DeleteColumn, MoveColumn};
use corkboard_kanban::discussion::{DeleteMessage, GetDiscussion, SendMessage};
use corkboard_kanban::{
    KanbanError, KanbanOperationProcessor, KanbanSession, OperationProcessor, PatchBatch,
};
use corkboard_operations::Execute;

/// Runs intents as operations on a local board, as the session's actor
#[derive(Debug, Clone)]
pub struct LocalDispatcher {
    processor: KanbanOperationProcessor,
    session: KanbanSession,
}

impl LocalDispatcher {
    pub fn new(session: KanbanSession) -> Self {
        Self {
            processor: KanbanOperationProcessor::new(),
            session,
        }
    }

    pub fn session(&self) -> &KanbanSession {
        &self.session
    }

    /// Session info for a mirror of this board, in the board's configured
    /// language
    pub fn session_info(&self) -> SessionInfo {
        SessionInfo::new(
            self.session.actor().clone(),
            self.session.ctx().config().lang.clone(),
        )
    }

    /// The full board, to seed a fresh mirror
    pub async fn snapshot(&self) -> Result<PatchBatch> {
        self.run(&GetBoard::new()).await
    }

    async fn run<O>(&self, operation: &O) -> Result<PatchBatch>
    where
        O: Execute<KanbanSession, KanbanError, Output = PatchBatch> + 'static,
    {
        Ok(self.processor.process(operation, &self.session).await?)
    }
}

#[async_trait]
impl Dispatcher for LocalDispatcher {
    async fn dispatch(&self, intent: &Intent) -> Result<PatchBatch> {
        match intent.clone() {
            Intent::AddColumn { title, anchor } => self.run(&AddColumn { title, anchor }).await,
            Intent::MoveColumn { id, anchor } => self.run(&MoveColumn { id, anchor }).await,
            Intent::DeleteColumn { id } => self.run(&DeleteColumn::new(id)).await,
            Intent::AddCard {
                column_id,
                anchor,
                title,
            } => {
                self.run(&AddCard {
                    column_id,
                    anchor,
                    title,
                    description: None,
                    attachments: Vec::new(),
                    due: None,
                })
                .await
            }
            Intent::MoveCard {
                id,
                column_id,
                anchor,
            } => {
                self.run(&MoveCard {
                    id,
                    column_id,
                    anchor,
                })
                .await
            }
            Intent::DeleteCard { id } => self.run(&DeleteCard::new(id)).await,
            Intent::UpdateCard {
                id,
                title,
                description,
                due,
            } => {
                self.run(&UpdateCard {
                    id,
                    title,
                    description,
                    attachments: None,
                    due,
                })
                .await
            }
            Intent::CompleteCard { id } => self.run(&CompleteCard::new(id)).await,
            Intent::UncompleteCard { id } => self.run(&UncompleteCard::new(id)).await,
            Intent::AssignUser { id, user } => self.run(&AssignUser { id, user }).await,
            Intent::UnassignUser { id, user } => self.run(&UnassignUser { id, user }).await,
            Intent::SendDiscussionMessage { card_id, body } => {
                self.run(&SendMessage::new(card_id, body)).await
            }
            Intent::DeleteMessage { id } => self.run(&DeleteMessage::new(id)).await,
            Intent::GetDiscussionUpdates { card_id } => {
                self.run(&GetDiscussion::new(card_id)).await
            }
            Intent::ProcessUpdates { batch } => Ok(batch),
        }
    }
}
