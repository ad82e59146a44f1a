//! The single point that runs command pipelines.

use crate::command::Outcome;
use crate::pipeline::Pipeline;
use chatline_core::error::{Error, Result};
use chatline_core::sink::ErrorSink;
use std::sync::Arc;
use tracing::debug;

/// Holds at most one pipeline and runs it on request.
///
/// Command failures are reported to the error sink instead of being
/// returned. Only a missing command is an error for the caller.
pub struct Invoker {
    command: Option<Pipeline>,
    sink: Arc<dyn ErrorSink>,
}

impl Invoker {
    pub fn new(sink: Arc<dyn ErrorSink>) -> Self {
        Self { command: None, sink }
    }

    /// Replace the held pipeline. Last set wins.
    pub fn set_command(&mut self, command: impl Into<Pipeline>) {
        self.command = Some(command.into());
    }

    /// Remove and return the held pipeline.
    pub fn take_command(&mut self) -> Option<Pipeline> {
        self.command.take()
    }

    pub fn has_command(&self) -> bool {
        self.command.is_some()
    }

    /// Run the held pipeline to completion.
    ///
    /// Returns `Ok(None)` when the pipeline failed and the sink was notified.
    /// The pipeline stays set and may be executed again.
    pub async fn execute_command(&mut self) -> Result<Option<Outcome>> {
        let pipeline = self.command.as_ref().ok_or(Error::NotSet)?;
        debug!(command = pipeline.innermost().name(), layers = ?pipeline.layers(), "Invoking command");

        match pipeline.execute().await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                self.sink.notify(&e);
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker").field("command", &self.command).finish()
    }
}
