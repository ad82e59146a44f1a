//! Capability tiers.
//!
//! Each tier maps to a model and a set of granted tools. Expert builds on
//! Advanced: it keeps Advanced's tools and adds one more.

use chatline_config::ModelConfig;
use chatline_core::agent::AgentSpec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Standard model, no tools
    #[default]
    Standard,
    /// Advanced model, can send email
    Advanced,
    /// Expert model, can send email and look up the weather
    Expert,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    /// Whether the conversation author needs an active subscription.
    pub fn requires_subscription(&self) -> bool {
        matches!(self, Self::Expert)
    }

    /// The agent this tier asks the handle builder for.
    pub fn agent_spec(&self, models: &ModelConfig, instructions: &str) -> AgentSpec {
        match self {
            Self::Standard => AgentSpec {
                model: models.standard.clone(),
                instructions: instructions.to_string(),
                tools: Vec::new(),
            },
            Self::Advanced => AgentSpec {
                model: models.advanced.clone(),
                instructions: instructions.to_string(),
                tools: vec![chatline_tools::send_email::NAME.to_string()],
            },
            Self::Expert => {
                let mut spec = Self::Advanced.agent_spec(models, instructions);
                spec.model = models.expert.clone();
                spec.tools.push(chatline_tools::weather::NAME.to_string());
                spec
            }
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            other => Err(format!(
                "unknown strategy '{other}' (expected standard, advanced or expert)"
            )),
        }
    }
}
