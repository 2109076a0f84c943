//! Operation processor trait

use crate::Execute;
use async_trait::async_trait;

/// Runs operations against a context, taking care of cross-cutting
/// concerns such as locking and audit logging.
#[async_trait]
pub trait OperationProcessor<C, E>: Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    /// Execute the operation and persist its log entry, if any
    async fn process<O>(&self, operation: &O, ctx: &C) -> Result<O::Output, E>
    where
        O: Execute<C, E> + 'static;
}
