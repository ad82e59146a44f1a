//! Email stub that reports the message it would send.
//!
//! Granted from the advanced tier upward. No mail is actually delivered.

use async_trait::async_trait;
use chatline_core::error::ToolError;
use chatline_core::tool::{Tool, ToolResult};
use tracing::info;

pub const NAME: &str = "send_email";

pub struct SendEmailTool;

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Send an email with the given subject to a recipient address."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "subject": {
                    "type": "string",
                    "description": "Subject line of the email"
                },
                "email_to": {
                    "type": "string",
                    "description": "Recipient email address"
                }
            },
            "required": ["subject", "email_to"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let subject = arguments["subject"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'subject' argument".into()))?;
        let email_to = arguments["email_to"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'email_to' argument".into()))?;

        if !email_to.contains('@') {
            return Err(ToolError::InvalidArguments(format!(
                "'{email_to}' is not an email address"
            )));
        }

        info!(to = %email_to, subject = %subject, "send_email tool invoked");

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: format!("Sending email to {email_to:?} with subject {subject:?}"),
        })
    }
}
