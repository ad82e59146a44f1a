//! Composable cross-cutting behaviors for command pipelines.

pub mod logger;
pub mod quota;
pub mod retry;
pub mod timeout;

pub use logger::Logger;
pub use quota::QuotaGuard;
pub use retry::{Retry, RetryOn, RetryPolicy};
pub use timeout::Timeout;
