//! # Chatline Commands
//!
//! The command pipeline:
//! - [`Command`] is one unit of work against the registry or a chat
//! - [`Pipeline`] wraps a command in any number of [`Decorator`]s
//!   ([`Logger`], [`QuotaGuard`], [`Retry`], [`Timeout`])
//! - [`Invoker`] runs one pipeline at a time and routes failures to an
//!   [`ErrorSink`](chatline_core::ErrorSink)

pub mod command;
pub mod decorators;
pub mod invoker;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use command::{Command, Outcome};
pub use decorators::{Logger, QuotaGuard, Retry, RetryOn, RetryPolicy, Timeout};
pub use invoker::Invoker;
pub use pipeline::{Decorator, Pipeline};
