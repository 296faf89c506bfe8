//! Demo agent and knowledge base configuration.

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Identifiers under which the demo entities are registered.
///
/// The echo agent and the router agent keep their built-in ids.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct DemoConfig {
    /// Id of the example agent that streams a fixed reply.
    #[arg(long, env = "DEMO_AGENT_ID", default_value = "example_agent")]
    pub demo_agent_id: String,

    /// Id of the example knowledge base.
    #[arg(long, env = "DEMO_KNOWLEDGE_BASE_ID", default_value = "example_knowledge_base")]
    pub demo_knowledge_base_id: String,

    /// Delay in milliseconds between two streamed characters of the example agent.
    #[arg(long, env = "DEMO_FRAGMENT_DELAY_MS", default_value_t = 100)]
    pub demo_fragment_delay_ms: u64,
}

impl DemoConfig {
    /// Validates the configured ids.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.demo_agent_id.trim().is_empty() {
            return Err(anyhow!("Demo agent id must not be empty"));
        }

        if self.demo_knowledge_base_id.trim().is_empty() {
            return Err(anyhow!("Demo knowledge base id must not be empty"));
        }

        Ok(())
    }

    /// Logs demo configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            agent_id = %self.demo_agent_id,
            knowledge_base_id = %self.demo_knowledge_base_id,
            fragment_delay_ms = self.demo_fragment_delay_ms,
            "Demo configuration"
        );
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            demo_agent_id: "example_agent".to_owned(),
            demo_knowledge_base_id: "example_knowledge_base".to_owned(),
            demo_fragment_delay_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        let config = DemoConfig {
            demo_agent_id: "  ".to_owned(),
            ..DemoConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(DemoConfig::default().validate().is_ok());
    }
}
