//! Offline echo provider.
//!
//! Answers every request by repeating the latest user message, tagged with the
//! requested model. Lets the CLI and tests drive the whole pipeline without a
//! network or an API key.

use async_trait::async_trait;
use chatline_core::error::BackendError;
use chatline_core::message::{Message, Role};
use chatline_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

#[derive(Debug, Default)]
pub struct EchoProvider;

#[async_trait]
impl Provider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, BackendError> {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let content = format!("[{}] {}", request.model, last_user);
        let tokens = (content.len() / 4) as u32;

        Ok(ProviderResponse {
            message: Message::assistant(content),
            usage: Some(Usage {
                prompt_tokens: 0,
                completion_tokens: tokens,
                total_tokens: tokens,
            }),
            model: request.model,
        })
    }
}
