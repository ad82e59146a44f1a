//! LLM Provider implementations for Chatline.
//!
//! All providers implement the `chatline_core::Provider` trait.

pub mod echo;
pub mod openai_compat;

pub use echo::EchoProvider;
pub use openai_compat::OpenAiCompatProvider;

use chatline_config::AppConfig;
use chatline_core::error::BackendError;
use chatline_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured provider.
///
/// `offline` selects the echo provider regardless of configuration.
pub fn build_from_config(
    config: &AppConfig,
    offline: bool,
) -> Result<Arc<dyn Provider>, BackendError> {
    if offline {
        tracing::info!("Using offline echo provider");
        return Ok(Arc::new(EchoProvider));
    }

    let api_key = config.api_key.clone().ok_or_else(|| {
        BackendError::NotConfigured(format!(
            "no API key for provider '{}' (set CHATLINE_API_KEY or GEMINI_API_KEY)",
            config.provider.name
        ))
    })?;

    Ok(Arc::new(OpenAiCompatProvider::with_timeout(
        config.provider.name.clone(),
        config.provider.api_url.clone(),
        api_key,
        Duration::from_secs(config.provider.timeout_secs),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_ignores_missing_key() {
        let provider = build_from_config(&AppConfig::default(), true).unwrap();
        assert_eq!(provider.name(), "echo");
    }

    #[test]
    fn missing_key_is_not_configured() {
        let err = build_from_config(&AppConfig::default(), false).err().unwrap();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }

    #[test]
    fn configured_provider_uses_config_name() {
        let config = AppConfig {
            api_key: Some("k".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config, false).unwrap();
        assert_eq!(provider.name(), "gemini");
    }
}
