//! Logging decorator.
//!
//! Pure passthrough: announces the innermost command before forwarding and
//! records how it went afterwards. Never alters or swallows the result.

use crate::command::Outcome;
use crate::pipeline::{Decorator, Pipeline};
use async_trait::async_trait;
use chatline_core::error::{Error, Result};
use chatline_security::audit::{AuditEvent, AuditLogger, AuditOutcome};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Logger {
    inner: Pipeline,
    verbose: bool,
    audit: Option<Arc<AuditLogger>>,
}

impl Logger {
    pub fn new(inner: Pipeline) -> Self {
        Self {
            inner,
            verbose: false,
            audit: None,
        }
    }

    /// Also log the command's field snapshot.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Write one audit entry per execution.
    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    fn audit_outcome(result: &Result<Outcome>) -> AuditOutcome {
        match result {
            Ok(_) => AuditOutcome::Success,
            Err(Error::Unauthorized(_) | Error::QuotaExceeded { .. }) => AuditOutcome::Denied,
            Err(_) => AuditOutcome::Failure,
        }
    }
}

#[async_trait]
impl Decorator for Logger {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn inner(&self) -> &Pipeline {
        &self.inner
    }

    async fn execute(&self) -> Result<Outcome> {
        let command = self.inner.innermost();
        let started = Utc::now();
        let at = started.format("%Y-%m-%d %H:%M:%S").to_string();

        if self.verbose {
            info!(command = command.name(), %at, fields = %command.fields(), "Executing command");
        } else {
            info!(command = command.name(), %at, "Executing command");
        }

        let result = self.inner.execute().await;
        let elapsed_ms = (Utc::now() - started).num_milliseconds();

        match &result {
            Ok(outcome) => debug!(command = command.name(), outcome = outcome.kind(), elapsed_ms, "Command succeeded"),
            Err(e) => warn!(command = command.name(), kind = e.kind(), elapsed_ms, "Command failed: {e}"),
        }

        if let Some(audit) = &self.audit {
            audit.log(
                AuditEvent::CommandExecuted {
                    command: command.name().to_string(),
                },
                &command.actor(),
                &command.target(),
                Self::audit_outcome(&result),
                result.as_ref().err().map(|e| e.to_string()),
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::test_helpers::{ScriptedBuilder, app_with, free_user};
    use chatline_agent::Strategy;

    #[tokio::test]
    async fn success_is_audited_and_passed_through() {
        let app = app_with(ScriptedBuilder::new());
        let audit = Arc::new(AuditLogger::new());
        let pipeline = Pipeline::from(Command::new_chat(Arc::clone(&app), free_user(3), "hi"))
            .wrap(|p| Logger::new(p).verbose(true).with_audit(Arc::clone(&audit)));

        let outcome = pipeline.execute().await.unwrap();
        assert!(matches!(outcome, Outcome::ChatCreated(_)));

        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor, "user:3");
        assert_eq!(entries[0].outcome, AuditOutcome::Success);
        assert_eq!(
            entries[0].event,
            AuditEvent::CommandExecuted {
                command: "NewChat".into()
            }
        );
    }

    #[tokio::test]
    async fn authorization_failure_is_denied_and_propagated() {
        let app = app_with(ScriptedBuilder::new());
        let chat = app.new_chat(free_user(1), "");
        let audit = Arc::new(AuditLogger::new());
        let pipeline = Pipeline::from(Command::switch_strategy(Arc::clone(&chat), Strategy::Expert))
            .wrap(|p| Logger::new(p).with_audit(Arc::clone(&audit)));

        let err = pipeline.execute().await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));

        let denied = audit.entries_by_outcome(&AuditOutcome::Denied);
        assert_eq!(denied.len(), 1);
        assert_eq!(denied[0].target, chat.id().to_string());
        assert!(denied[0].details.as_deref().unwrap_or_default().contains("subscription"));
    }

    #[tokio::test]
    async fn backend_failure_is_a_failure() {
        let builder = ScriptedBuilder::new();
        builder.fail_runs(1);
        let app = app_with(builder);
        let chat = app.new_chat(free_user(1), "");
        let audit = Arc::new(AuditLogger::new());
        let pipeline = Pipeline::from(Command::prompt(chat, "hi")).wrap(|p| Logger::new(p).with_audit(Arc::clone(&audit)));

        assert!(pipeline.execute().await.is_err());
        assert_eq!(audit.entries_by_outcome(&AuditOutcome::Failure).len(), 1);
    }
}
