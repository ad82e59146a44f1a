//! The application registry.
//!
//! Owns every live chat keyed by conversation id. The map sits behind a
//! `std::sync::RwLock`; no lock is held across an await point.

use crate::chat::Chat;
use crate::context::ExecutionContext;
use crate::strategy::Strategy;
use chatline_config::AppConfig;
use chatline_core::agent::HandleBuilder;
use chatline_core::error::Error;
use chatline_core::event::{DomainEvent, EventBus};
use chatline_core::message::ConversationId;
use chatline_core::sink::ErrorSink;
use chatline_core::user::User;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info};

pub struct App {
    config: Arc<AppConfig>,
    builder: Arc<dyn HandleBuilder>,
    events: Arc<EventBus>,
    chats: RwLock<HashMap<ConversationId, Arc<Chat>>>,
}

impl App {
    pub fn new(config: Arc<AppConfig>, builder: Arc<dyn HandleBuilder>) -> Self {
        Self {
            config,
            builder,
            events: Arc::new(EventBus::default()),
            chats: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ConversationId, Arc<Chat>>> {
        self.chats.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ConversationId, Arc<Chat>>> {
        self.chats.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Register a new chat for `author` on the standard strategy.
    pub fn new_chat(&self, author: User, instructions: impl Into<String>) -> Arc<Chat> {
        let id = ConversationId::new();
        let context = ExecutionContext::new(
            Strategy::Standard,
            instructions,
            self.config.models.clone(),
            Arc::clone(&self.builder),
        );
        let author_id = author.id;
        let chat = Arc::new(Chat::new(id.clone(), author, context, Arc::clone(&self.events)));

        self.write().insert(id.clone(), Arc::clone(&chat));

        info!(conversation_id = %id, author_id, "Chat created");
        self.events.publish(DomainEvent::ConversationCreated {
            conversation_id: id.to_string(),
            author_id,
            timestamp: Utc::now(),
        });
        chat
    }

    /// Remove a chat. Returns whether it was present; absence is not an error.
    pub fn remove_chat(&self, id: &ConversationId) -> bool {
        let removed = self.write().remove(id).is_some();
        if removed {
            info!(conversation_id = %id, "Chat removed");
            self.events.publish(DomainEvent::ConversationRemoved {
                conversation_id: id.to_string(),
                timestamp: Utc::now(),
            });
        }
        removed
    }

    pub fn get_chat(&self, id: &ConversationId) -> Option<Arc<Chat>> {
        self.read().get(id).cloned()
    }

    /// All live chats, oldest first.
    pub fn chats(&self) -> Vec<Arc<Chat>> {
        let mut chats: Vec<_> = self.read().values().cloned().collect();
        chats.sort_by_key(|c| c.created_at());
        chats
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl ErrorSink for App {
    fn notify(&self, err: &Error) {
        error!(kind = err.kind(), "app error: {err}");
        self.events.publish(DomainEvent::CommandFailed {
            kind: err.kind().to_string(),
            error_message: err.to_string(),
            timestamp: Utc::now(),
        });
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("chats", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::CountingBuilder;

    fn app() -> App {
        App::new(Arc::new(AppConfig::default()), CountingBuilder::new())
    }

    #[test]
    fn new_chat_is_registered_on_standard() {
        let app = app();
        let chat = app.new_chat(User::new(1, "alice"), "be brief");

        assert_eq!(app.len(), 1);
        let found = app.get_chat(chat.id()).unwrap();
        assert!(Arc::ptr_eq(&found, &chat));
        assert_eq!(found.author().id, 1);
    }

    #[tokio::test]
    async fn new_chat_starts_unbuilt() {
        let app = app();
        let chat = app.new_chat(User::new(1, "alice"), "");
        let snapshot = chat.context_snapshot().await;
        assert_eq!(snapshot.strategy, Strategy::Standard);
        assert!(!snapshot.built);
    }

    #[test]
    fn ids_are_unique() {
        let app = app();
        let a = app.new_chat(User::new(1, "alice"), "");
        let b = app.new_chat(User::new(1, "alice"), "");
        assert_ne!(a.id(), b.id());
        assert_eq!(app.chats().len(), 2);
    }

    #[test]
    fn remove_is_idempotent() {
        let app = app();
        let chat = app.new_chat(User::new(1, "alice"), "");
        assert!(app.remove_chat(chat.id()));
        assert!(!app.remove_chat(chat.id()));
        assert!(app.is_empty());
        assert!(app.get_chat(chat.id()).is_none());
    }

    #[tokio::test]
    async fn notify_publishes_command_failed() {
        let app = app();
        let mut rx = app.events().subscribe();
        app.notify(&Error::Unauthorized("nope".into()));

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::CommandFailed { kind, error_message, .. } => {
                assert_eq!(kind, "unauthorized");
                assert!(error_message.contains("nope"));
            }
            other => panic!("Expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_creates_are_all_registered() {
        let app = Arc::new(app());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let app = Arc::clone(&app);
                std::thread::spawn(move || {
                    app.new_chat(User::new(i, "user"), "");
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(app.len(), 8);
    }
}
