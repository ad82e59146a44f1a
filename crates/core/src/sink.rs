//! Where the invoker reports failures it does not re-raise.

use crate::error::Error;
use std::sync::Mutex;

/// Receives every error that escapes a command chain at the invoker.
pub trait ErrorSink: Send + Sync {
    fn notify(&self, error: &Error);
}

/// Logs each error through `tracing` at error level.
#[derive(Debug, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn notify(&self, error: &Error) {
        tracing::error!(kind = error.kind(), "app error: {error}");
    }
}

/// Keeps the rendered message of every reported error, in order.
///
/// For callers that need to learn about failures programmatically, since the
/// invoker does not return them.
#[derive(Debug, Default)]
pub struct MemorySink {
    errors: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(kind, message)` pairs of every reported error.
    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Kinds of every reported error.
    pub fn kinds(&self) -> Vec<String> {
        self.errors().into_iter().map(|(kind, _)| kind).collect()
    }

    pub fn count(&self) -> usize {
        self.errors.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

impl ErrorSink for MemorySink {
    fn notify(&self, error: &Error) {
        self.errors
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((error.kind().to_string(), error.to_string()));
    }
}
