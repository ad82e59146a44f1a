//! Domain events for observing the conversation runtime.
//!
//! Events are published when a conversation is created or removed, a prompt
//! completes, a strategy changes, or a command fails at the invoker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A conversation was registered
    ConversationCreated {
        conversation_id: String,
        author_id: u64,
        timestamp: DateTime<Utc>,
    },

    /// A conversation was removed from the registry
    ConversationRemoved {
        conversation_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A prompt run finished and its messages were appended
    PromptCompleted {
        conversation_id: String,
        model: String,
        new_messages: usize,
        timestamp: DateTime<Utc>,
    },

    /// A conversation's strategy was reassigned
    StrategySwitched {
        conversation_id: String,
        strategy: String,
        timestamp: DateTime<Utc>,
    },

    /// A command failed and was routed to the error sink
    CommandFailed {
        kind: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
