//! Card discussion commands

mod delete;
mod get;
mod send;

pub use delete::DeleteMessage;
pub use get::GetDiscussion;
pub use send::SendMessage;
