//! Shared fixtures for command and decorator tests.

use async_trait::async_trait;
use chatline_agent::App;
use chatline_config::AppConfig;
use chatline_core::agent::{AgentHandle, AgentSpec, HandleBuilder, RunOutput};
use chatline_core::error::BackendError;
use chatline_core::message::Message;
use chatline_core::user::User;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Shared knobs and counters for every handle a [`ScriptedBuilder`] builds.
#[derive(Default)]
struct Script {
    runs: AtomicUsize,
    failures_left: AtomicUsize,
    hang: AtomicBool,
}

struct ScriptedHandle {
    spec: AgentSpec,
    script: Arc<Script>,
}

#[async_trait]
impl AgentHandle for ScriptedHandle {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn run(&self, prompt: &str, _history: &[Message]) -> Result<RunOutput, BackendError> {
        let run = self.script.runs.fetch_add(1, Ordering::SeqCst) + 1;
        if self.script.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let failing = self
            .script
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BackendError::Network(format!("failure {run}")));
        }

        let output = format!("reply to {prompt}");
        Ok(RunOutput {
            output: output.clone(),
            new_messages: vec![Message::assistant(output)],
            model: self.spec.model.clone(),
        })
    }
}

/// Builds handles that add one message per run, fail on demand and count
/// every run.
#[derive(Default)]
pub struct ScriptedBuilder {
    script: Arc<Script>,
    builds: AtomicUsize,
}

impl ScriptedBuilder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next `n` runs with a network error.
    pub fn fail_runs(&self, n: usize) {
        self.script.failures_left.store(n, Ordering::SeqCst);
    }

    /// Never complete a run.
    pub fn hang(&self) {
        self.script.hang.store(true, Ordering::SeqCst);
    }

    pub fn runs(&self) -> usize {
        self.script.runs.load(Ordering::SeqCst)
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HandleBuilder for ScriptedBuilder {
    async fn build(&self, spec: &AgentSpec) -> Result<Arc<dyn AgentHandle>, BackendError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedHandle {
            spec: spec.clone(),
            script: Arc::clone(&self.script),
        }))
    }
}

pub fn app_with(builder: Arc<ScriptedBuilder>) -> Arc<App> {
    Arc::new(App::new(Arc::new(AppConfig::default()), builder))
}

pub fn free_user(id: u64) -> User {
    User::new(id, format!("user-{id}"))
}

pub fn subscriber(id: u64) -> User {
    free_user(id).with_subscription_end(chrono::Utc::now() + chrono::Duration::days(30))
}
