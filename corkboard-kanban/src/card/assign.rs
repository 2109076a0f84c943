//! AssignUser / UnassignUser commands

use crate::capability::Capability;
use crate::error::{KanbanError, Result};
use crate::patch::{CardFields, PatchBatch, PatchEntry};
use crate::session::KanbanSession;
use crate::types::{CardId, UserId};
use corkboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Assigning oneself and assigning others are separate capabilities
fn required_capability(session: &KanbanSession, user: &UserId) -> Capability {
    if user == session.actor() {
        Capability::AssignSelf
    } else {
        Capability::AssignOthers
    }
}

/// Assign a user to a card
#[operation(verb = "assign", noun = "user", description = "Assign a user to a card")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AssignUser {
    /// The card
    pub id: CardId,
    /// The user to assign; the acting user when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
}

impl AssignUser {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self {
            id: id.into(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<UserId>) -> Self {
        self.user = Some(user.into());
        self
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        let user = self.user.clone().unwrap_or_else(|| session.actor().clone());
        session.require(required_capability(session, &user))?;

        let ctx = session.ctx();
        let mut card = ctx.read_card(&self.id).await?;
        ctx.read_user(&user).await?;

        card.assign(user.clone());
        ctx.write_card(&card).await?;

        debug!(card = %card.id, user = %user, "assigned user");

        Ok(PatchBatch::new().with(PatchEntry::update_card(
            CardFields::new(card.id).with_assignees(card.assignees),
        )))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AssignUser {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}

/// Remove a user from a card's assignees
#[operation(
    verb = "unassign",
    noun = "user",
    description = "Remove a user from a card"
)]
#[derive(Debug, Deserialize, Serialize)]
pub struct UnassignUser {
    /// The card
    pub id: CardId,
    /// The user to remove; the acting user when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
}

impl UnassignUser {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self {
            id: id.into(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<UserId>) -> Self {
        self.user = Some(user.into());
        self
    }

    async fn run(&self, session: &KanbanSession) -> Result<PatchBatch> {
        let user = self.user.clone().unwrap_or_else(|| session.actor().clone());
        session.require(required_capability(session, &user))?;

        let ctx = session.ctx();
        let mut card = ctx.read_card(&self.id).await?;
        card.unassign(&user);
        ctx.write_card(&card).await?;

        debug!(card = %card.id, user = %user, "unassigned user");

        Ok(PatchBatch::new().with(PatchEntry::update_card(
            CardFields::new(card.id).with_assignees(card.assignees),
        )))
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for UnassignUser {
    type Output = PatchBatch;

    async fn execute(&self, session: &KanbanSession) -> ExecutionResult<PatchBatch, KanbanError> {
        let started = Instant::now();
        session.logged(self, started, self.run(session).await)
    }
}
