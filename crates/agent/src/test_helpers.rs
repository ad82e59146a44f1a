//! Shared test helpers for agent-side tests.

use async_trait::async_trait;
use chatline_core::agent::{AgentHandle, AgentSpec, HandleBuilder, RunOutput};
use chatline_core::error::BackendError;
use chatline_core::message::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A handle that answers `[model] prompt` and adds exactly one message per run.
pub struct EchoHandle {
    spec: AgentSpec,
}

#[async_trait]
impl AgentHandle for EchoHandle {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn run(&self, prompt: &str, history: &[Message]) -> Result<RunOutput, BackendError> {
        let output = format!("[{}] {} (history: {})", self.spec.model, prompt, history.len());
        Ok(RunOutput {
            output: output.clone(),
            new_messages: vec![Message::assistant(output)],
            model: self.spec.model.clone(),
        })
    }
}

/// A builder that records every spec it is asked to build.
#[derive(Default)]
pub struct CountingBuilder {
    built: Mutex<Vec<AgentSpec>>,
    fail_next: AtomicBool,
}

impl CountingBuilder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn builds(&self) -> usize {
        self.built.lock().unwrap().len()
    }

    pub fn built_models(&self) -> Vec<String> {
        self.built.lock().unwrap().iter().map(|s| s.model.clone()).collect()
    }

    /// Make the next build fail with a network error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl HandleBuilder for CountingBuilder {
    async fn build(&self, spec: &AgentSpec) -> Result<Arc<dyn AgentHandle>, BackendError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(BackendError::Network("model init failed".into()));
        }
        self.built.lock().unwrap().push(spec.clone());
        Ok(Arc::new(EchoHandle { spec: spec.clone() }))
    }
}
