//! Per-tier message ceiling.

use crate::command::Outcome;
use crate::pipeline::{Decorator, Pipeline};
use async_trait::async_trait;
use chatline_agent::Chat;
use chatline_config::QuotaConfig;
use chatline_core::error::{Error, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Refuses to forward once the guarded chat holds as many messages as its
/// author's tier allows.
///
/// The tier is read at check time, so an expiring subscription takes effect
/// on the next command.
pub struct QuotaGuard {
    inner: Pipeline,
    chat: Arc<Chat>,
    quota: QuotaConfig,
}

impl QuotaGuard {
    pub fn new(inner: Pipeline, chat: Arc<Chat>, quota: QuotaConfig) -> Self {
        Self { inner, chat, quota }
    }
}

#[async_trait]
impl Decorator for QuotaGuard {
    fn name(&self) -> &'static str {
        "quota_guard"
    }

    fn inner(&self) -> &Pipeline {
        &self.inner
    }

    async fn execute(&self) -> Result<Outcome> {
        let tier = self.chat.author().tier();
        let limit = self.quota.ceiling(tier);
        let count = self.chat.message_count().await;

        if count >= limit {
            warn!(conversation_id = %self.chat.id(), %tier, limit, count, "Message quota reached");
            return Err(Error::QuotaExceeded { limit, count });
        }

        debug!(conversation_id = %self.chat.id(), %tier, limit, count, "Quota check passed");
        self.inner.execute().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::test_helpers::{ScriptedBuilder, app_with, free_user, subscriber};
    use chatline_core::user::User;

    async fn chat_with_messages(author: User, n: usize) -> Arc<Chat> {
        let app = app_with(ScriptedBuilder::new());
        let chat = app.new_chat(author, "");
        for i in 0..n {
            chat.prompt(&format!("msg {i}")).await.unwrap();
        }
        chat
    }

    fn guarded(chat: &Arc<Chat>, quota: QuotaConfig) -> Pipeline {
        Pipeline::from(Command::prompt(Arc::clone(chat), "next")).wrap(|p| QuotaGuard::new(p, Arc::clone(chat), quota))
    }

    #[tokio::test]
    async fn unsubscribed_boundary() {
        let below = chat_with_messages(free_user(1), 9).await;
        assert!(guarded(&below, QuotaConfig::default()).execute().await.is_ok());

        let at = chat_with_messages(free_user(1), 10).await;
        let err = guarded(&at, QuotaConfig::default()).execute().await.unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { limit: 10, count: 10 }));
        assert_eq!(at.message_count().await, 10);
    }

    #[tokio::test]
    async fn subscribed_boundary() {
        let quota = QuotaConfig::default();
        let below = chat_with_messages(subscriber(1), 149).await;
        assert!(guarded(&below, quota.clone()).execute().await.is_ok());

        let at = chat_with_messages(subscriber(1), 150).await;
        let err = guarded(&at, quota).execute().await.unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { limit: 150, count: 150 }));
    }

    #[tokio::test]
    async fn expired_subscription_uses_unsubscribed_ceiling() {
        let expired = User::new(1, "lapsed").with_subscription_end(chrono::Utc::now() - chrono::Duration::days(1));
        let chat = chat_with_messages(expired, 10).await;
        let err = guarded(&chat, QuotaConfig::default()).execute().await.unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { limit: 10, .. }));
    }

    #[tokio::test]
    async fn custom_ceilings_apply() {
        let chat = chat_with_messages(free_user(1), 2).await;
        let quota = QuotaConfig {
            subscribed_messages: 5,
            unsubscribed_messages: 2,
        };
        assert!(guarded(&chat, quota).execute().await.is_err());
    }
}
