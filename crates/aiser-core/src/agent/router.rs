//! Agent that forwards conversations to one of several sub-agents.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::{Agent, ChatMessage, Error, Identifiable, ReplyStream, Result, TokenUsage};

/// Tracing target for router agent selection.
const TRACING_TARGET: &str = "aiser_core::agent::router";

/// Matches `@agent <name>` where the name is made of word characters and hyphens.
static AGENT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@agent\s+([\w-]+)").expect("agent directive pattern is valid")
});

/// Agent that forwards each conversation to exactly one sub-agent.
///
/// The sub-agent is picked by an `@agent <id>` directive in the latest
/// message. The selection sticks: later conversations without a directive,
/// or with a directive naming an unknown id, go to the previously selected
/// sub-agent. The first sub-agent is selected initially.
///
/// Every reply starts with a header fragment naming the selected sub-agent,
/// followed by the sub-agent's own fragments.
///
/// # Concurrency
///
/// The selection is shared by all callers of one router instance and is
/// updated atomically. Each call captures the index it selected, so the
/// header and the forwarded fragments of one reply always refer to the same
/// sub-agent. When calls race, the last directive wins for later calls, and
/// [`Agent::latest_reply_token_usage`] reports the sub-agent selected by the
/// most recent call.
pub struct RouterAgent {
    id: String,
    agents: Vec<Arc<dyn Agent>>,
    current_agent_index: AtomicUsize,
}

impl RouterAgent {
    /// Default identifier of the router agent.
    pub const DEFAULT_ID: &'static str = "router_agent";

    /// Creates a new router over the given sub-agents.
    ///
    /// # Errors
    ///
    /// Returns an internal error if `agents` is empty.
    pub fn new(agents: Vec<Arc<dyn Agent>>) -> Result<Self> {
        if agents.is_empty() {
            return Err(Error::internal("router agent requires at least one sub-agent"));
        }

        Ok(Self {
            id: Self::DEFAULT_ID.to_owned(),
            agents,
            current_agent_index: AtomicUsize::new(0),
        })
    }

    /// Overrides the router's id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns the sub-agents in selection order.
    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    /// Returns the currently selected sub-agent.
    pub fn current_agent(&self) -> &Arc<dyn Agent> {
        &self.agents[self.current_index()]
    }

    fn current_index(&self) -> usize {
        self.current_agent_index.load(Ordering::Acquire)
    }

    /// Applies a directive found in `latest` and returns the selected index.
    fn select(&self, latest: &str) -> usize {
        let requested = AGENT_DIRECTIVE
            .captures(latest)
            .and_then(|captures| captures.get(1))
            .map(|name| name.as_str());

        let Some(requested) = requested else {
            return self.current_index();
        };

        match self.agents.iter().position(|agent| agent.accepts_id(requested)) {
            Some(index) => {
                self.current_agent_index.store(index, Ordering::Release);
                tracing::debug!(
                    target: TRACING_TARGET,
                    router_id = %self.id,
                    agent_id = %self.agents[index].id(),
                    "Switched sub-agent"
                );
                index
            }
            None => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    router_id = %self.id,
                    requested = %requested,
                    "Directive names an unknown sub-agent, keeping selection"
                );
                self.current_index()
            }
        }
    }
}

impl fmt::Debug for RouterAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agent_ids: Vec<_> = self.agents.iter().map(|agent| agent.id()).collect();
        f.debug_struct("RouterAgent")
            .field("id", &self.id)
            .field("agents", &agent_ids)
            .field("current_agent_index", &self.current_index())
            .finish()
    }
}

impl Identifiable for RouterAgent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Agent for RouterAgent {
    fn reply(&self, conversation: Vec<ChatMessage>) -> ReplyStream {
        let latest = conversation.last().map(ChatMessage::text).unwrap_or_default();
        let agent = &self.agents[self.select(latest)];

        let header = ChatMessage::new(format!("#### Agent \"{}\":\n", agent.id()));
        agent.reply(conversation).prepend(header)
    }

    fn latest_reply_token_usage(&self) -> Option<TokenUsage> {
        self.current_agent().latest_reply_token_usage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EchoAgent;

    struct Fixed {
        id: &'static str,
        usage: TokenUsage,
    }

    impl Identifiable for Fixed {
        fn id(&self) -> &str {
            self.id
        }
    }

    impl Agent for Fixed {
        fn reply(&self, _conversation: Vec<ChatMessage>) -> ReplyStream {
            ReplyStream::from_fragments([ChatMessage::new(self.id)])
        }

        fn latest_reply_token_usage(&self) -> Option<TokenUsage> {
            Some(self.usage)
        }
    }

    fn router() -> anyhow::Result<RouterAgent> {
        let agents: Vec<Arc<dyn Agent>> = vec![
            Arc::new(Fixed {
                id: "a",
                usage: TokenUsage::new(1, 2),
            }),
            Arc::new(Fixed {
                id: "b",
                usage: TokenUsage::new(3, 4),
            }),
        ];
        Ok(RouterAgent::new(agents)?)
    }

    async fn ask(router: &RouterAgent, text: &str) -> anyhow::Result<String> {
        Ok(router.reply(vec![ChatMessage::new(text)]).collect_text().await?)
    }

    #[tokio::test]
    async fn defaults_to_first_agent() -> anyhow::Result<()> {
        let router = router()?;
        assert_eq!(ask(&router, "hello").await?, "#### Agent \"a\":\na");
        assert_eq!(router.latest_reply_token_usage(), Some(TokenUsage::new(1, 2)));
        Ok(())
    }

    #[tokio::test]
    async fn directive_selection_persists() -> anyhow::Result<()> {
        let router = router()?;

        assert_eq!(ask(&router, "please @agent b help").await?, "#### Agent \"b\":\nb");
        assert_eq!(ask(&router, "no directive").await?, "#### Agent \"b\":\nb");
        assert_eq!(router.current_agent().id(), "b");
        assert_eq!(router.latest_reply_token_usage(), Some(TokenUsage::new(3, 4)));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_directive_keeps_selection() -> anyhow::Result<()> {
        let router = router()?;

        ask(&router, "@agent b").await?;
        assert_eq!(ask(&router, "@agent ghost").await?, "#### Agent \"b\":\nb");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_replies_keep_header_and_body_together() -> anyhow::Result<()> {
        let router = Arc::new(router()?);

        let tasks: Vec<_> = (0..200)
            .map(|index| {
                let router = Arc::clone(&router);
                let target = if index % 2 == 0 { "a" } else { "b" };
                tokio::spawn(async move { ask(&router, &format!("@agent {target}")).await })
            })
            .collect();

        for task in tasks {
            let reply = task.await??;
            let (header, body) = reply
                .split_once('\n')
                .ok_or_else(|| anyhow::anyhow!("reply without header: {reply:?}"))?;
            assert_eq!(header, format!("#### Agent \"{body}\":"));
            assert!(body == "a" || body == "b");
        }
        Ok(())
    }

    #[tokio::test]
    async fn only_latest_message_is_inspected() -> anyhow::Result<()> {
        let router = router()?;
        let conversation = vec![ChatMessage::new("@agent b"), ChatMessage::new("hi")];

        let reply = router.reply(conversation).collect_text().await?;
        assert_eq!(reply, "#### Agent \"a\":\na");
        Ok(())
    }

    #[tokio::test]
    async fn hyphenated_ids_are_matched() -> anyhow::Result<()> {
        let agents: Vec<Arc<dyn Agent>> = vec![
            Arc::new(EchoAgent::new("echo")),
            Arc::new(EchoAgent::new("echo-two")),
        ];
        let router = RouterAgent::new(agents)?.with_id("front");

        let reply = ask(&router, "@agent echo-two").await?;
        assert!(reply.starts_with("#### Agent \"echo-two\":\n"));
        assert_eq!(router.id(), "front");
        Ok(())
    }

    #[test]
    fn rejects_empty_agent_list() {
        assert!(RouterAgent::new(Vec::new()).is_err());
    }
}
