//! The concrete units of work the invoker runs.
//!
//! A [`Command`] captures everything it needs at construction, so the same
//! command can be executed again (the retry decorator relies on this).

use chatline_agent::{App, Chat, Strategy};
use chatline_core::agent::RunOutput;
use chatline_core::error::{Error, Result};
use chatline_core::message::ConversationId;
use chatline_core::user::User;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub enum Command {
    /// Register a new conversation for `author`.
    NewChat {
        app: Arc<App>,
        author: User,
        instructions: String,
    },
    /// Remove `chat`; only its author may do this.
    RemoveChat {
        app: Arc<App>,
        chat: Arc<Chat>,
        requester: User,
    },
    /// Submit a prompt to `chat`.
    Prompt { chat: Arc<Chat>, text: String },
    /// Assign a new strategy to `chat`.
    SwitchStrategy { chat: Arc<Chat>, strategy: Strategy },
}

/// What a successful command produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    ChatCreated(Arc<Chat>),
    ChatRemoved(ConversationId),
    Prompted(RunOutput),
    StrategySwitched(Strategy),
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChatCreated(_) => "chat_created",
            Self::ChatRemoved(_) => "chat_removed",
            Self::Prompted(_) => "prompted",
            Self::StrategySwitched(_) => "strategy_switched",
        }
    }

    pub fn into_chat(self) -> Option<Arc<Chat>> {
        match self {
            Self::ChatCreated(chat) => Some(chat),
            _ => None,
        }
    }

    pub fn into_run_output(self) -> Option<RunOutput> {
        match self {
            Self::Prompted(output) => Some(output),
            _ => None,
        }
    }
}

impl Command {
    pub fn new_chat(app: Arc<App>, author: User, instructions: impl Into<String>) -> Self {
        Self::NewChat {
            app,
            author,
            instructions: instructions.into(),
        }
    }

    pub fn remove_chat(app: Arc<App>, chat: Arc<Chat>, requester: User) -> Self {
        Self::RemoveChat { app, chat, requester }
    }

    pub fn prompt(chat: Arc<Chat>, text: impl Into<String>) -> Self {
        Self::Prompt {
            chat,
            text: text.into(),
        }
    }

    pub fn switch_strategy(chat: Arc<Chat>, strategy: Strategy) -> Self {
        Self::SwitchStrategy { chat, strategy }
    }

    /// Stable command name, used in logs and audit entries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewChat { .. } => "NewChat",
            Self::RemoveChat { .. } => "RemoveChat",
            Self::Prompt { .. } => "Prompt",
            Self::SwitchStrategy { .. } => "SwitchStrategy",
        }
    }

    /// The conversation this command acts on, if it already exists.
    pub fn chat(&self) -> Option<&Arc<Chat>> {
        match self {
            Self::NewChat { .. } => None,
            Self::RemoveChat { chat, .. } | Self::Prompt { chat, .. } | Self::SwitchStrategy { chat, .. } => {
                Some(chat)
            }
        }
    }

    /// Who is acting, as `user:<id>`.
    pub fn actor(&self) -> String {
        let id = match self {
            Self::NewChat { author, .. } => author.id,
            Self::RemoveChat { requester, .. } => requester.id,
            Self::Prompt { chat, .. } | Self::SwitchStrategy { chat, .. } => chat.author().id,
        };
        format!("user:{id}")
    }

    /// The conversation acted on, or `-` before one exists.
    pub fn target(&self) -> String {
        self.chat().map_or_else(|| "-".to_string(), |c| c.id().to_string())
    }

    /// Snapshot of the command's fields for verbose logging.
    pub fn fields(&self) -> serde_json::Value {
        match self {
            Self::NewChat { author, instructions, .. } => json!({
                "author": author,
                "instructions": instructions,
            }),
            Self::RemoveChat { chat, requester, .. } => json!({
                "chat": chat.id().to_string(),
                "requester": requester,
            }),
            Self::Prompt { chat, text } => json!({
                "chat": chat.id().to_string(),
                "text": text,
            }),
            Self::SwitchStrategy { chat, strategy } => json!({
                "chat": chat.id().to_string(),
                "strategy": strategy,
            }),
        }
    }

    pub async fn execute(&self) -> Result<Outcome> {
        match self {
            Self::NewChat {
                app,
                author,
                instructions,
            } => Ok(Outcome::ChatCreated(app.new_chat(author.clone(), instructions.clone()))),

            Self::RemoveChat { app, chat, requester } => {
                if chat.author().id != requester.id {
                    return Err(Error::Unauthorized(format!(
                        "user {} is not allowed to remove chat {}",
                        requester.id,
                        chat.id()
                    )));
                }
                app.remove_chat(chat.id());
                Ok(Outcome::ChatRemoved(chat.id().clone()))
            }

            Self::Prompt { chat, text } => Ok(Outcome::Prompted(chat.prompt(text).await?)),

            Self::SwitchStrategy { chat, strategy } => {
                if strategy.requires_subscription() && !chat.author().is_subscription_active() {
                    return Err(Error::Unauthorized(format!(
                        "cannot switch to the {strategy} strategy without an active subscription"
                    )));
                }
                chat.set_strategy(*strategy).await;
                info!(conversation_id = %chat.id(), %strategy, "Strategy switched");
                Ok(Outcome::StrategySwitched(*strategy))
            }
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.name())
            .field("actor", &self.actor())
            .field("target", &self.target())
            .finish()
    }
}
