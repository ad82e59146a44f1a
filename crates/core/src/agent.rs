//! Agent handle contracts.
//!
//! A handle is the expensive, ready-to-run backend agent an execution context
//! caches per conversation. A builder turns an [`AgentSpec`] (what a strategy
//! asks for) into a handle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::error::BackendError;
use crate::message::Message;

/// What to build: the model, the system instructions and the granted tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Model identifier (e.g., "gemini-2.0-flash")
    pub model: String,

    /// System instructions given at conversation creation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instructions: String,

    /// Names of the tools the agent may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

/// The result of a single agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// Final text produced by the agent
    pub output: String,

    /// Messages this run adds to the conversation history, in order
    pub new_messages: Vec<Message>,

    /// Model that produced the output
    pub model: String,
}

/// A built, ready-to-run backend agent.
#[async_trait]
pub trait AgentHandle: Send + Sync {
    /// The [`AgentSpec`] this handle was built from.
    fn spec(&self) -> &AgentSpec;

    /// Run one prompt against the given history.
    async fn run(&self, prompt: &str, history: &[Message]) -> std::result::Result<RunOutput, BackendError>;
}

/// Builds agent handles. Assumed slow and side-effecting.
#[async_trait]
pub trait HandleBuilder: Send + Sync {
    async fn build(&self, spec: &AgentSpec) -> std::result::Result<Arc<dyn AgentHandle>, BackendError>;
}
