//! # Chatline Core
//!
//! Domain types, traits, and error definitions for the Chatline conversation
//! runtime. Every collaborator the command pipeline talks to is declared here
//! as a trait; implementations live in their own crates:
//! - `Provider`: an LLM backend (`chatline-providers`)
//! - `Tool`: an auxiliary capability granted by a strategy (`chatline-tools`)
//! - `AgentHandle` / `HandleBuilder`: the expensive per-conversation backend
//!   handle and the factory that builds it (`chatline-agent`)

pub mod agent;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod sink;
pub mod tool;
pub mod user;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentHandle, AgentSpec, HandleBuilder, RunOutput};
pub use error::{BackendError, Error, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use sink::{ErrorSink, MemorySink, TracingErrorSink};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
pub use user::{Tier, User};
