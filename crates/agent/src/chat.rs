//! The conversation aggregate.
//!
//! A chat owns its execution context and message history behind one async
//! mutex, so prompts and strategy switches on the same chat never interleave.
//! History only grows through [`Chat::prompt`].

use crate::context::ExecutionContext;
use crate::strategy::Strategy;
use chatline_core::agent::RunOutput;
use chatline_core::event::{DomainEvent, EventBus};
use chatline_core::message::{ConversationId, Message};
use chatline_core::user::User;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub struct Chat {
    id: ConversationId,
    author: User,
    created_at: DateTime<Utc>,
    events: Arc<EventBus>,
    state: Mutex<ChatState>,
}

struct ChatState {
    context: ExecutionContext,
    messages: Vec<Message>,
}

/// Point-in-time view of a chat's execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContextSnapshot {
    pub strategy: Strategy,
    pub built: bool,
    pub builds: u64,
}

impl Chat {
    pub fn new(id: ConversationId, author: User, context: ExecutionContext, events: Arc<EventBus>) -> Self {
        Self {
            id,
            author,
            created_at: Utc::now(),
            events,
            state: Mutex::new(ChatState {
                context,
                messages: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn author(&self) -> &User {
        &self.author
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn message_count(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    pub async fn strategy(&self) -> Strategy {
        self.state.lock().await.context.strategy()
    }

    pub async fn context_snapshot(&self) -> ContextSnapshot {
        let state = self.state.lock().await;
        ContextSnapshot {
            strategy: state.context.strategy(),
            built: state.context.is_built(),
            builds: state.context.build_count(),
        }
    }

    /// Run a prompt against the current history and append the new messages.
    ///
    /// On failure the history is left untouched.
    pub async fn prompt(&self, text: &str) -> chatline_core::Result<RunOutput> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let output = state.context.run(text, &state.messages).await?;
        state.messages.extend(output.new_messages.iter().cloned());

        debug!(
            conversation_id = %self.id,
            added = output.new_messages.len(),
            total = state.messages.len(),
            "Prompt appended to history"
        );
        self.events.publish(DomainEvent::PromptCompleted {
            conversation_id: self.id.to_string(),
            model: output.model.clone(),
            new_messages: output.new_messages.len(),
            timestamp: Utc::now(),
        });

        Ok(output)
    }

    /// Assign a new strategy. Authorization is the caller's concern.
    pub async fn set_strategy(&self, strategy: Strategy) {
        self.state.lock().await.context.set_strategy(strategy);
        self.events.publish(DomainEvent::StrategySwitched {
            conversation_id: self.id.to_string(),
            strategy: strategy.to_string(),
            timestamp: Utc::now(),
        });
    }
}

impl std::fmt::Debug for Chat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chat")
            .field("id", &self.id)
            .field("author", &self.author)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl std::fmt::Display for Chat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Chat(id={}, author={})", self.id, self.author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::CountingBuilder;
    use chatline_config::ModelConfig;

    fn chat(builder: Arc<CountingBuilder>) -> Chat {
        let context = ExecutionContext::new(Strategy::Standard, "", ModelConfig::default(), builder);
        Chat::new(ConversationId::new(), User::new(1, "alice"), context, Arc::new(EventBus::default()))
    }

    #[tokio::test]
    async fn prompt_appends_new_messages() {
        let chat = chat(CountingBuilder::new());
        chat.prompt("hi").await.unwrap();
        chat.prompt("again").await.unwrap();

        let messages = chat.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "[gemini-1.5-flash] again (history: 1)");
    }

    #[tokio::test]
    async fn failed_prompt_leaves_history_untouched() {
        let builder = CountingBuilder::new();
        builder.fail_next();
        let chat = chat(builder);

        assert!(chat.prompt("hi").await.is_err());
        assert_eq!(chat.message_count().await, 0);
    }

    #[tokio::test]
    async fn set_strategy_clears_cache_and_publishes() {
        let builder = CountingBuilder::new();
        let chat = chat(builder.clone());
        let mut rx = chat.events.subscribe();

        chat.prompt("hi").await.unwrap();
        chat.set_strategy(Strategy::Advanced).await;

        let snapshot = chat.context_snapshot().await;
        assert_eq!(snapshot.strategy, Strategy::Advanced);
        assert!(!snapshot.built);
        assert_eq!(snapshot.builds, 1);

        let first = rx.recv().await.unwrap();
        assert!(matches!(first.as_ref(), DomainEvent::PromptCompleted { .. }));
        let second = rx.recv().await.unwrap();
        match second.as_ref() {
            DomainEvent::StrategySwitched { strategy, .. } => assert_eq!(strategy, "advanced"),
            other => panic!("Expected StrategySwitched, got {other:?}"),
        }
    }
}
