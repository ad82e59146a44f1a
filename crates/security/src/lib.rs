//! Audit logging of executed commands.
//!
//! Provides:
//! - **Audit logging**: structured record of which command ran, for whom,
//!   against which conversation, and whether it succeeded or was denied

pub mod audit;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, DEFAULT_MAX_ENTRIES, TracingSink};
