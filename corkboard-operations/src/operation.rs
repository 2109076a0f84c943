//! The core operation traits

use crate::ExecutionResult;
use async_trait::async_trait;

/// Metadata describing an operation
///
/// Implemented by the `#[operation]` attribute macro.
pub trait Operation {
    /// The action, e.g. "move"
    fn verb(&self) -> &'static str;

    /// The target entity, e.g. "card"
    fn noun(&self) -> &'static str;

    /// Human readable description
    fn description(&self) -> &'static str;

    /// Canonical op string, e.g. "move card"
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Execute an operation against a context
#[async_trait]
pub trait Execute<C, E>: Operation + Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    /// What a successful execution produces
    type Output: Send;

    /// Run the operation
    async fn execute(&self, ctx: &C) -> ExecutionResult<Self::Output, E>;
}
