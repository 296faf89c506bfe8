//! OpenAI-compatible chat completions over registered agents.

use std::sync::Arc;

use aiser_core::{Agent, AgentRegistry, ChatMessage, Result};
use futures::StreamExt;
use futures::stream::BoxStream;

use super::native::{NativeStream, encode_native};
use super::reply::{collect_reply, guarded_reply};
use crate::handler::response::{ChatCompletionChunk, ChatCompletionResponse};

/// Stream of OpenAI-compatible completion chunks.
pub type CompletionStream = BoxStream<'static, ChatCompletionChunk>;

/// Bridges agents to the chat protocols.
///
/// Resolves the target agent by id and re-encodes its reply either as an
/// OpenAI-compatible completion (buffered or streamed) or as the native
/// newline-delimited JSON stream. Resolution happens eagerly, so an unknown
/// id fails before any agent method runs.
#[derive(Debug, Clone)]
pub struct ChatService {
    agents: Arc<AgentRegistry>,
}

impl ChatService {
    /// Creates a new chat service over `agents`.
    pub fn new(agents: Arc<AgentRegistry>) -> Self {
        Self { agents }
    }

    /// Returns the agent registered under `agent_id`.
    pub fn resolve(&self, agent_id: &str) -> Result<Arc<dyn Agent>> {
        self.agents.resolve(agent_id)
    }

    /// Drains the agent's reply into one completion.
    ///
    /// Usage is not reported in this mode.
    pub async fn complete(
        &self,
        model: &str,
        conversation: Vec<ChatMessage>,
    ) -> Result<ChatCompletionResponse> {
        let agent = self.resolve(model)?;
        let content = collect_reply(agent, conversation, "openai").await?;
        Ok(ChatCompletionResponse::assistant_reply(model, content))
    }

    /// Streams the agent's reply as completion chunks.
    ///
    /// Emits a role chunk, one content chunk per fragment, a stop chunk and a
    /// trailing usage chunk, in that order. An agent failure ends the stream
    /// right after the last delivered content chunk.
    pub fn stream_completion(
        &self,
        model: &str,
        conversation: Vec<ChatMessage>,
    ) -> Result<CompletionStream> {
        let agent = self.resolve(model)?;
        let model = model.to_owned();

        let stream = async_stream::stream! {
            let fragments = guarded_reply(Arc::clone(&agent), conversation, "openai");
            futures::pin_mut!(fragments);

            yield ChatCompletionChunk::role(&model);

            while let Some(fragment) = fragments.next().await {
                match fragment {
                    Ok(fragment) => {
                        yield ChatCompletionChunk::content(&model, fragment.into_text());
                    }
                    Err(_) => return,
                }
            }

            yield ChatCompletionChunk::stop(&model);
            yield ChatCompletionChunk::usage(&model, agent.latest_reply_token_usage());
        };

        Ok(stream.boxed())
    }

    /// Streams the agent's reply as newline-delimited JSON records.
    pub fn stream_native(
        &self,
        agent_id: &str,
        conversation: Vec<ChatMessage>,
    ) -> Result<NativeStream> {
        let agent = self.resolve(agent_id)?;
        Ok(encode_native(guarded_reply(agent, conversation, "native")))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use aiser_core::{EchoAgent, ErrorKind, Identifiable, ReplyStream, TokenUsage};

    use super::*;
    use crate::handler::response::FINISH_REASON_STOP;
    use crate::service::chat::reply::tests::{Endless, Failing, Scripted};

    struct Counting;

    impl Identifiable for Counting {
        fn id(&self) -> &str {
            "counting"
        }
    }

    impl Agent for Counting {
        fn reply(&self, _conversation: Vec<ChatMessage>) -> ReplyStream {
            ReplyStream::from_fragments([ChatMessage::new("ok")])
        }

        fn latest_reply_token_usage(&self) -> Option<TokenUsage> {
            Some(TokenUsage::new(10, 20))
        }
    }

    fn service() -> anyhow::Result<ChatService> {
        let agents: Vec<Arc<dyn Agent>> = vec![
            Arc::new(EchoAgent::new("echo")),
            Arc::new(Counting),
            Arc::new(Failing),
            Arc::new(Scripted {
                id: "silent",
                fragments: Vec::new(),
            }),
            Arc::new(Scripted {
                id: "scripted",
                fragments: vec!["Hel", "lo", "!"],
            }),
        ];
        Ok(ChatService::new(Arc::new(AgentRegistry::new("agent", agents)?)))
    }

    #[tokio::test]
    async fn buffered_completion_echoes() -> anyhow::Result<()> {
        let completion = service()?
            .complete("echo", vec![ChatMessage::new("hi")])
            .await?;

        assert_eq!(completion.model, "echo");
        assert_eq!(completion.choices[0].message.content, "hi");
        assert_eq!(completion.choices[0].finish_reason.as_deref(), Some(FINISH_REASON_STOP));
        assert!(completion.usage.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn buffered_equals_streamed_concatenation() -> anyhow::Result<()> {
        let service = service()?;

        let buffered = service.complete("scripted", Vec::new()).await?;
        let streamed: String = service
            .stream_completion("scripted", Vec::new())?
            .filter_map(|chunk| async move { chunk.choices[0].delta.content.clone() })
            .collect::<Vec<_>>()
            .await
            .concat();

        assert_eq!(buffered.choices[0].message.content, streamed);
        assert_eq!(streamed, "Hello!");
        Ok(())
    }

    #[tokio::test]
    async fn streamed_chunk_order() -> anyhow::Result<()> {
        let service = service()?;

        for (agent_id, fragments) in [("silent", 0), ("counting", 1), ("scripted", 3)] {
            let chunks: Vec<_> = service
                .stream_completion(agent_id, Vec::new())?
                .collect()
                .await;
            assert_eq!(chunks.len(), fragments + 3);

            let first = &chunks[0].choices[0];
            assert!(first.delta.role.is_some());
            assert!(first.delta.content.is_none());

            for chunk in &chunks[1..=fragments] {
                assert!(chunk.choices[0].delta.content.is_some());
                assert!(chunk.choices[0].finish_reason.is_none());
            }

            let stop = &chunks[fragments + 1];
            assert_eq!(stop.choices[0].finish_reason.as_deref(), Some(FINISH_REASON_STOP));
            assert_eq!(stop.choices[0].delta, Default::default());
            assert!(stop.usage.is_none());

            let usage = &chunks[fragments + 2];
            assert!(usage.choices[0].finish_reason.is_none());
            assert!(usage.usage.is_some());
        }
        Ok(())
    }

    #[tokio::test]
    async fn streamed_usage_is_reported() -> anyhow::Result<()> {
        let service = service()?;

        let chunks: Vec<_> = service.stream_completion("counting", Vec::new())?.collect().await;
        let usage = chunks.last().and_then(|chunk| chunk.usage);
        assert_eq!(usage.map(|usage| usage.total_tokens), Some(30));

        let chunks: Vec<_> = service.stream_completion("echo", Vec::new())?.collect().await;
        let usage = chunks.last().and_then(|chunk| chunk.usage);
        assert_eq!(usage.map(|usage| usage.total_tokens), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn failing_agent_stream_is_cut_short() -> anyhow::Result<()> {
        let chunks: Vec<_> = service()?
            .stream_completion("failing", Vec::new())?
            .collect()
            .await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].choices[0].delta.content.as_deref(), Some("partial"));
        assert!(chunks.iter().all(|chunk| chunk.usage.is_none()));
        Ok(())
    }

    #[tokio::test]
    async fn failing_agent_buffered_is_an_error() -> anyhow::Result<()> {
        let result = service()?.complete("failing", Vec::new()).await;
        assert!(result.is_err_and(|e| e.kind() == ErrorKind::Agent));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_model_is_not_found() -> anyhow::Result<()> {
        let service = service()?;

        assert!(service.stream_completion("ghost", Vec::new()).is_err_and(|e| e.is_not_found()));
        assert!(service.stream_native("ghost", Vec::new()).is_err_and(|e| e.is_not_found()));
        assert!(
            service
                .complete("ghost", Vec::new())
                .await
                .is_err_and(|e| e.is_not_found())
        );
        Ok(())
    }

    fn endless_service() -> anyhow::Result<(ChatService, tokio::sync::oneshot::Receiver<usize>)> {
        let (agent, exited) = Endless::new();
        let agents: Vec<Arc<dyn Agent>> = vec![Arc::new(agent)];
        let service = ChatService::new(Arc::new(AgentRegistry::new("agent", agents)?));
        Ok((service, exited))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dropped_completion_stream_stops_producer() -> anyhow::Result<()> {
        let (service, exited) = endless_service()?;

        let chunks: Vec<_> = service
            .stream_completion("endless", Vec::new())?
            .take(3)
            .collect()
            .await;
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].choices[0].delta.content.as_deref(), Some("x"));

        let sent = tokio::time::timeout(Duration::from_secs(1), exited).await??;
        assert!(sent >= 2);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dropped_native_stream_stops_producer() -> anyhow::Result<()> {
        let (service, exited) = endless_service()?;

        let mut records = service.stream_native("endless", Vec::new())?;
        for _ in 0..3 {
            assert!(records.next().await.is_some());
        }
        drop(records);

        let sent = tokio::time::timeout(Duration::from_secs(1), exited).await??;
        assert!(sent >= 3);
        Ok(())
    }
}
