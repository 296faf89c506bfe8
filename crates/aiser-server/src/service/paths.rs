use serde::{Deserialize, Serialize};

use crate::service::ServiceConfig;

/// Path prefixes of the chat APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPaths {
    /// Prefix of the native chat API, e.g. `/agent`.
    pub classic_agent: String,
    /// Prefix of the OpenAI-compatible API, e.g. `/openai-compatible/v1`.
    pub openai_compatible: String,
}

impl ApiPaths {
    /// Route of the native chat endpoint.
    pub fn agent_chat(&self) -> String {
        format!("{}/{{agentId}}/chat", self.classic_agent.trim_end_matches('/'))
    }

    /// Route of the OpenAI-compatible chat completions endpoint.
    pub fn chat_completions(&self) -> String {
        format!("{}/chat/completions", self.openai_compatible.trim_end_matches('/'))
    }
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self::from(&ServiceConfig::default())
    }
}

impl From<&ServiceConfig> for ApiPaths {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            classic_agent: config.classic_agent_api_path.clone(),
            openai_compatible: config.openai_compatible_api_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_routes() {
        let paths = ApiPaths::default();
        assert_eq!(paths.agent_chat(), "/agent/{agentId}/chat");
        assert_eq!(paths.chat_completions(), "/openai-compatible/v1/chat/completions");
    }

    #[test]
    fn root_prefix() {
        let paths = ApiPaths {
            classic_agent: "/".to_owned(),
            openai_compatible: "/".to_owned(),
        };
        assert_eq!(paths.agent_chat(), "/{agentId}/chat");
        assert_eq!(paths.chat_completions(), "/chat/completions");
    }
}
