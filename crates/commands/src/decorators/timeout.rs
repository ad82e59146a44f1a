//! Deadline around the inner node.

use crate::command::Outcome;
use crate::pipeline::{Decorator, Pipeline};
use async_trait::async_trait;
use chatline_core::error::{Error, Result};
use std::time::Duration;
use tracing::warn;

/// Fails with [`Error::Timeout`] if the inner node has not finished in time.
/// The inner future is dropped at the deadline.
pub struct Timeout {
    inner: Pipeline,
    after: Duration,
}

impl Timeout {
    pub fn new(inner: Pipeline, after: Duration) -> Self {
        Self { inner, after }
    }
}

#[async_trait]
impl Decorator for Timeout {
    fn name(&self) -> &'static str {
        "timeout"
    }

    fn inner(&self) -> &Pipeline {
        &self.inner
    }

    async fn execute(&self) -> Result<Outcome> {
        match tokio::time::timeout(self.after, self.inner.execute()).await {
            Ok(result) => result,
            Err(_) => {
                let after_ms = self.after.as_millis() as u64;
                warn!(command = self.inner.innermost().name(), after_ms, "Command timed out");
                Err(Error::Timeout { after_ms })
            }
        }
    }
}
