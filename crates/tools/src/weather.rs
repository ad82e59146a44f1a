//! Weather lookup stub returning deterministic conditions for a city.
//!
//! Granted to the expert tier only. Conditions are derived from a hash of the
//! city name so repeated lookups agree.

use async_trait::async_trait;
use chatline_core::error::ToolError;
use chatline_core::tool::{Tool, ToolResult};

pub const NAME: &str = "get_weather";

pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Look up the current weather conditions for a city."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The city to look up weather for"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let city = arguments["city"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'city' argument".into()))?;

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: format!("The weather in {city} is {}", conditions_for(city)),
        })
    }
}

fn conditions_for(city: &str) -> &'static str {
    const CONDITIONS: [&str; 6] = ["sunny", "partly cloudy", "overcast", "rainy", "stormy", "foggy"];

    let hash: u32 = city
        .to_lowercase()
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    CONDITIONS[hash as usize % CONDITIONS.len()]
}
