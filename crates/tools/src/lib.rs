//! Built-in tool implementations for Chatline.
//!
//! These are the auxiliary capabilities strategies grant: the advanced tier
//! may send email, the expert tier may also look up the weather.

pub mod send_email;
pub mod weather;

use chatline_core::tool::ToolRegistry;

pub use send_email::SendEmailTool;
pub use weather::WeatherTool;

/// Create a tool registry with all built-in tools.
///
/// Registration does not grant access; each agent only sees the tools its
/// strategy names.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SendEmailTool));
    registry.register(Box::new(WeatherTool));
    registry
}
