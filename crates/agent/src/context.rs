//! Per-conversation execution context.
//!
//! Binds a [`Strategy`] to a lazily built agent handle. The handle is built on
//! the first run after construction or after a strategy assignment, and reused
//! for every run in between.

use crate::strategy::Strategy;
use chatline_config::ModelConfig;
use chatline_core::agent::{AgentHandle, HandleBuilder, RunOutput};
use chatline_core::message::Message;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ExecutionContext {
    strategy: Strategy,
    instructions: String,
    models: ModelConfig,
    builder: Arc<dyn HandleBuilder>,
    /// Invariant: when present, built from `strategy`.
    handle: Option<Arc<dyn AgentHandle>>,
    builds: u64,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("strategy", &self.strategy)
            .field("built", &self.handle.is_some())
            .field("builds", &self.builds)
            .finish()
    }
}

impl ExecutionContext {
    pub fn new(
        strategy: Strategy,
        instructions: impl Into<String>,
        models: ModelConfig,
        builder: Arc<dyn HandleBuilder>,
    ) -> Self {
        Self {
            strategy,
            instructions: instructions.into(),
            models,
            builder,
            handle: None,
            builds: 0,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Assign a strategy and drop the cached handle.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        debug!(from = %self.strategy, to = %strategy, "Strategy assigned, clearing cached agent");
        self.strategy = strategy;
        self.handle = None;
    }

    /// Whether a handle is currently cached.
    pub fn is_built(&self) -> bool {
        self.handle.is_some()
    }

    /// How many handles this context has built so far.
    pub fn build_count(&self) -> u64 {
        self.builds
    }

    /// Run a prompt, building the handle first if none is cached.
    ///
    /// A failed build leaves the cache empty, so the next run tries again.
    pub async fn run(&mut self, prompt: &str, history: &[Message]) -> chatline_core::Result<RunOutput> {
        let handle = match self.handle.clone() {
            Some(handle) => handle,
            None => {
                let spec = self.strategy.agent_spec(&self.models, &self.instructions);
                info!(strategy = %self.strategy, model = %spec.model, tools = ?spec.tools, "Building agent");
                let handle = self.builder.build(&spec).await?;
                self.builds += 1;
                self.handle = Some(Arc::clone(&handle));
                handle
            }
        };

        Ok(handle.run(prompt, history).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::CountingBuilder;

    fn context(builder: Arc<CountingBuilder>) -> ExecutionContext {
        ExecutionContext::new(Strategy::Standard, "be brief", ModelConfig::default(), builder)
    }

    #[tokio::test]
    async fn builds_lazily_and_once() {
        let builder = CountingBuilder::new();
        let mut ctx = context(builder.clone());
        assert!(!ctx.is_built());
        assert_eq!(builder.builds(), 0);

        ctx.run("one", &[]).await.unwrap();
        ctx.run("two", &[]).await.unwrap();

        assert_eq!(builder.builds(), 1);
        assert_eq!(ctx.build_count(), 1);
        assert!(ctx.is_built());
    }

    #[tokio::test]
    async fn switching_strategy_forces_one_rebuild() {
        let builder = CountingBuilder::new();
        let mut ctx = context(builder.clone());

        ctx.run("one", &[]).await.unwrap();
        ctx.set_strategy(Strategy::Advanced);
        assert!(!ctx.is_built());
        assert_eq!(builder.builds(), 1);

        let out = ctx.run("two", &[]).await.unwrap();
        ctx.run("three", &[]).await.unwrap();

        assert_eq!(builder.builds(), 2);
        assert_eq!(builder.built_models(), vec!["gemini-1.5-flash", "gemini-2.0-flash"]);
        assert_eq!(out.model, "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn reading_never_builds() {
        let builder = CountingBuilder::new();
        let ctx = context(builder.clone());
        assert_eq!(ctx.strategy(), Strategy::Standard);
        assert_eq!(ctx.instructions(), "be brief");
        let _ = format!("{ctx:?}");
        assert_eq!(builder.builds(), 0);
    }

    #[tokio::test]
    async fn failed_build_is_retried_on_next_run() {
        let builder = CountingBuilder::new();
        builder.fail_next();
        let mut ctx = context(builder.clone());

        let err = ctx.run("one", &[]).await.unwrap_err();
        assert!(err.is_transient());
        assert!(!ctx.is_built());

        ctx.run("two", &[]).await.unwrap();
        assert_eq!(ctx.build_count(), 1);
    }

    #[tokio::test]
    async fn spec_carries_instructions() {
        let builder = CountingBuilder::new();
        let mut ctx = context(builder.clone());
        let out = ctx.run("hello", &[Message::user("earlier")]).await.unwrap();
        assert_eq!(out.output, "[gemini-1.5-flash] hello (history: 1)");
    }
}
