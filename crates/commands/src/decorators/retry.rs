//! Bounded retry with a fixed delay between attempts.

use crate::command::Outcome;
use crate::pipeline::{Decorator, Pipeline};
use async_trait::async_trait;
use chatline_config::RetryConfig;
use chatline_core::error::{Error, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Which failures are worth another attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryOn {
    /// Every error
    #[default]
    Any,
    /// Only errors reporting [`Error::is_transient`]
    Transient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least 1
    pub max_attempts: u32,
    pub delay: Duration,
    pub retry_on: RetryOn,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            retry_on: RetryOn::Any,
        }
    }

    pub fn transient_only(mut self) -> Self {
        self.retry_on = RetryOn::Transient;
        self
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        let policy = Self::new(config.max_attempts, config.delay());
        if config.transient_only {
            policy.transient_only()
        } else {
            policy
        }
    }

    fn should_retry(&self, error: &Error) -> bool {
        match self.retry_on {
            RetryOn::Any => true,
            RetryOn::Transient => error.is_transient(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

pub struct Retry {
    inner: Pipeline,
    policy: RetryPolicy,
}

impl Retry {
    pub fn new(inner: Pipeline, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl Decorator for Retry {
    fn name(&self) -> &'static str {
        "retry"
    }

    fn inner(&self) -> &Pipeline {
        &self.inner
    }

    async fn execute(&self) -> Result<Outcome> {
        let command = self.inner.innermost().name();
        let max = self.policy.max_attempts;
        let mut attempt = 1;

        loop {
            match self.inner.execute().await {
                Ok(outcome) => {
                    if attempt > 1 {
                        info!(command, attempt, "Command succeeded after retry");
                    }
                    return Ok(outcome);
                }
                Err(e) => {
                    warn!(command, attempt, max, kind = e.kind(), "Attempt failed: {e}");
                    if attempt >= max || !self.policy.should_retry(&e) {
                        return Err(e);
                    }
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
