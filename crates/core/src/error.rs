//! Error types for the Chatline domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for every command in the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    // --- Authorization ---
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // --- Usage quota ---
    #[error("You have reached the maximum number of messages ({limit}) for this chat (current: {count})")]
    QuotaExceeded { limit: usize, count: usize },

    // --- Backend errors ---
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // --- Invoker ---
    #[error("Command not set")]
    NotSet,

    // --- Deadline ---
    #[error("Command timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Short, stable name of the error kind (used in logs and events).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Backend(_) => "backend",
            Self::NotSet => "not_set",
            Self::Timeout { .. } => "timeout",
            Self::Config { .. } => "config",
            Self::Serialization(_) => "serialization",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Whether retrying the same command could plausibly succeed.
    ///
    /// Authorization, quota and configuration failures are deterministic and
    /// never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Backend(e) => e.is_transient(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl BackendError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_correctly() {
        let err = Error::Backend(BackendError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn quota_error_mentions_limit() {
        let err = Error::QuotaExceeded { limit: 10, count: 10 };
        assert!(err.to_string().contains("(10)"));
        assert_eq!(err.kind(), "quota_exceeded");
    }

    #[test]
    fn transient_classification() {
        assert!(Error::from(BackendError::Network("reset".into())).is_transient());
        assert!(Error::from(BackendError::RateLimited { retry_after_secs: 5 }).is_transient());
        assert!(
            Error::from(BackendError::ApiError {
                status_code: 503,
                message: "unavailable".into()
            })
            .is_transient()
        );
        assert!(
            !Error::from(BackendError::ApiError {
                status_code: 400,
                message: "bad request".into()
            })
            .is_transient()
        );
        assert!(!Error::from(BackendError::AuthenticationFailed("bad key".into())).is_transient());
        assert!(Error::Timeout { after_ms: 10 }.is_transient());
        assert!(!Error::Unauthorized("nope".into()).is_transient());
        assert!(!Error::QuotaExceeded { limit: 1, count: 1 }.is_transient());
    }
}
