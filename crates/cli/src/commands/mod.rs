//! Subcommand implementations and the wiring they share.

pub mod chat;
pub mod config_cmd;
pub mod demo;

use chatline_agent::{App, Chat, ProviderAgentBuilder};
use chatline_commands::{Command, Logger, Pipeline, QuotaGuard, Retry, RetryPolicy};
use chatline_config::AppConfig;
use chatline_core::error::Error;
use chatline_core::sink::ErrorSink;
use chatline_security::{AuditLogger, TracingSink};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

/// Everything a session needs: the registry and the audit log.
pub struct Runtime {
    pub config: Arc<AppConfig>,
    pub app: Arc<App>,
    pub audit: Arc<AuditLogger>,
    pub verbose: bool,
}

impl Runtime {
    /// Load the configuration and wire provider, tools and registry together.
    pub fn bootstrap(offline: bool, verbose: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

        if !offline && !config.has_api_key() {
            eprintln!();
            eprintln!("  ERROR: No API key configured!");
            eprintln!();
            eprintln!("  Set one of these environment variables:");
            eprintln!("    CHATLINE_API_KEY=...   (generic)");
            eprintln!("    GEMINI_API_KEY=...     (Gemini)");
            eprintln!();
            eprintln!("  Or add it to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            eprintln!("  Or run with --offline to use the echo provider.");
            eprintln!();
            return Err("No API key found. See above for setup instructions.".into());
        }

        let provider = chatline_providers::build_from_config(&config, offline)?;
        let tools = Arc::new(chatline_tools::default_registry());
        let builder = Arc::new(ProviderAgentBuilder::new(provider, tools, &config));

        let config = Arc::new(config);
        let app = Arc::new(App::new(Arc::clone(&config), builder));
        spawn_event_logger(&app);

        Ok(Self {
            config,
            app,
            audit: Arc::new(AuditLogger::with_sinks(vec![Box::new(TracingSink)])),
            verbose,
        })
    }

    /// Sink that tells the user and forwards to the registry.
    pub fn sink(&self) -> Arc<dyn ErrorSink> {
        Arc::new(ConsoleSink {
            app: Arc::clone(&self.app),
        })
    }

    /// Wrap in the audit logger. `verbose` adds the command's fields.
    pub fn logged(&self, pipeline: Pipeline, verbose: bool) -> Pipeline {
        pipeline.wrap(|p| {
            Logger::new(p)
                .verbose(verbose || self.verbose)
                .with_audit(Arc::clone(&self.audit))
        })
    }

    /// Quota check and logging around a prompt, no retry.
    pub fn guarded_prompt(&self, chat: &Arc<Chat>, text: &str) -> Pipeline {
        self.logged(self.quota_checked(chat, text), false)
    }

    /// Quota check, then retry, then logging around a prompt.
    pub fn prompt(&self, chat: &Arc<Chat>, text: &str) -> Pipeline {
        let policy = RetryPolicy::from_config(&self.config.retry);
        let pipeline = self.quota_checked(chat, text).wrap(|p| Retry::new(p, policy));
        self.logged(pipeline, false)
    }

    fn quota_checked(&self, chat: &Arc<Chat>, text: &str) -> Pipeline {
        let quota = self.config.quota.clone();
        Pipeline::from(Command::prompt(Arc::clone(chat), text)).wrap(|p| QuotaGuard::new(p, Arc::clone(chat), quota))
    }
}

struct ConsoleSink {
    app: Arc<App>,
}

impl ErrorSink for ConsoleSink {
    fn notify(&self, error: &Error) {
        eprintln!("  [Error] {error}");
        self.app.notify(error);
    }
}

/// Trace every domain event the registry publishes.
fn spawn_event_logger(app: &App) {
    let mut rx = app.events().subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => debug!(?event, "Domain event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
