//! Conversation side of Chatline.
//!
//! - [`Strategy`] picks a capability tier (model + granted tools)
//! - [`ExecutionContext`] lazily builds the tier's agent handle and keeps it
//!   until the strategy is reassigned
//! - [`Chat`] ties an author, a context and the message history together
//! - [`App`] is the registry that owns every live chat
//! - [`ProviderAgent`] is the reference handle: a tool-calling loop over a
//!   `Provider`

pub mod app;
pub mod chat;
pub mod context;
pub mod handle;
pub mod strategy;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use app::App;
pub use chat::{Chat, ContextSnapshot};
pub use context::ExecutionContext;
pub use handle::{ProviderAgent, ProviderAgentBuilder};
pub use strategy::Strategy;
