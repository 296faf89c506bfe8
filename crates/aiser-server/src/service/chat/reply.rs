//! Guarded consumption of an agent's reply stream.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use aiser_core::{Agent, ChatMessage, Error, Result};
use futures::{Stream, StreamExt};

use crate::utility::tracing_targets::STREAM;

/// Logs the end of a reply stream, including streams dropped mid-way.
struct Lifecycle {
    agent_id: String,
    protocol: &'static str,
    fragments: usize,
    finished: bool,
}

impl Lifecycle {
    fn start(agent_id: &str, protocol: &'static str) -> Self {
        tracing::debug!(
            target: STREAM,
            agent_id = %agent_id,
            protocol,
            "reply stream started"
        );

        Self {
            agent_id: agent_id.to_owned(),
            protocol,
            fragments: 0,
            finished: false,
        }
    }

    fn complete(&mut self) {
        self.finished = true;
        tracing::debug!(
            target: STREAM,
            agent_id = %self.agent_id,
            protocol = self.protocol,
            fragments = self.fragments,
            "reply stream completed"
        );
    }

    fn fail(&mut self, error: &Error) {
        self.finished = true;
        tracing::error!(
            target: STREAM,
            agent_id = %self.agent_id,
            protocol = self.protocol,
            fragments = self.fragments,
            error = %error,
            "reply stream failed"
        );
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!(
                target: STREAM,
                agent_id = %self.agent_id,
                protocol = self.protocol,
                fragments = self.fragments,
                "reply stream closed before completion"
            );
        }
    }
}

/// Runs `agent` over `conversation` and yields its fragments in order.
///
/// Nothing happens until the returned stream is first polled. The stream
/// ends after the first error, which is yielded once; a panic inside the
/// agent is turned into such an error. Dropping the returned stream drops
/// the agent's reply stream, which cancels it.
pub(crate) fn guarded_reply(
    agent: Arc<dyn Agent>,
    conversation: Vec<ChatMessage>,
    protocol: &'static str,
) -> impl Stream<Item = Result<ChatMessage>> + Send + 'static {
    async_stream::stream! {
        let mut lifecycle = Lifecycle::start(agent.id(), protocol);
        let panicked = || Error::agent(agent.id().to_owned(), "agent panicked while replying");

        let reply = std::panic::catch_unwind(AssertUnwindSafe(|| agent.reply(conversation)));
        let mut fragments = match reply {
            Ok(reply) => AssertUnwindSafe(reply).catch_unwind(),
            Err(_) => {
                let error = panicked();
                lifecycle.fail(&error);
                yield Err(error);
                return;
            }
        };

        while let Some(item) = fragments.next().await {
            match item {
                Ok(Ok(fragment)) => {
                    lifecycle.fragments += 1;
                    yield Ok(fragment);
                }
                Ok(Err(error)) => {
                    lifecycle.fail(&error);
                    yield Err(error);
                    return;
                }
                Err(_) => {
                    let error = panicked();
                    lifecycle.fail(&error);
                    yield Err(error);
                    return;
                }
            }
        }

        lifecycle.complete();
    }
}

/// Drains `agent`'s reply and concatenates the fragment texts.
pub(crate) async fn collect_reply(
    agent: Arc<dyn Agent>,
    conversation: Vec<ChatMessage>,
    protocol: &'static str,
) -> Result<String> {
    let reply = guarded_reply(agent, conversation, protocol);
    futures::pin_mut!(reply);

    let mut text = String::new();
    while let Some(fragment) = reply.next().await {
        text.push_str(fragment?.text());
    }

    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use aiser_core::{EchoAgent, ErrorKind, Identifiable, ReplyStream};
    use futures::stream;
    use tokio::sync::oneshot;

    use super::*;

    /// Agent yielding a fixed list of fragments.
    pub(crate) struct Scripted {
        pub(crate) id: &'static str,
        pub(crate) fragments: Vec<&'static str>,
    }

    impl Identifiable for Scripted {
        fn id(&self) -> &str {
            self.id
        }
    }

    impl Agent for Scripted {
        fn reply(&self, _conversation: Vec<ChatMessage>) -> ReplyStream {
            ReplyStream::from_fragments(self.fragments.clone().into_iter().map(ChatMessage::new))
        }
    }

    /// Agent that fails after one fragment.
    pub(crate) struct Failing;

    impl Identifiable for Failing {
        fn id(&self) -> &str {
            "failing"
        }
    }

    impl Agent for Failing {
        fn reply(&self, _conversation: Vec<ChatMessage>) -> ReplyStream {
            ReplyStream::new(stream::iter([
                Ok(ChatMessage::new("partial")),
                Err(Error::agent("failing", "model unavailable")),
                Ok(ChatMessage::new("never sent")),
            ]))
        }
    }

    /// Agent whose background producer sends fragments until the consumer leaves.
    ///
    /// The producer reports how many fragments it sent once it stops.
    pub(crate) struct Endless {
        exited: std::sync::Mutex<Option<oneshot::Sender<usize>>>,
    }

    impl Endless {
        pub(crate) fn new() -> (Self, oneshot::Receiver<usize>) {
            let (tx, rx) = oneshot::channel();
            let agent = Self {
                exited: std::sync::Mutex::new(Some(tx)),
            };
            (agent, rx)
        }
    }

    impl Identifiable for Endless {
        fn id(&self) -> &str {
            "endless"
        }
    }

    impl Agent for Endless {
        fn reply(&self, _conversation: Vec<ChatMessage>) -> ReplyStream {
            let (sender, stream) = ReplyStream::channel(1);
            let exited = self.exited.lock().ok().and_then(|mut exited| exited.take());

            tokio::spawn(async move {
                let mut sent = 0usize;
                while sender.send(Ok(ChatMessage::new("x"))).await {
                    sent += 1;
                }
                if let Some(exited) = exited {
                    let _ = exited.send(sent);
                }
            });

            stream
        }
    }

    /// Agent that panics while producing its second fragment.
    pub(crate) struct Panicking;

    impl Identifiable for Panicking {
        fn id(&self) -> &str {
            "panicking"
        }
    }

    impl Agent for Panicking {
        fn reply(&self, _conversation: Vec<ChatMessage>) -> ReplyStream {
            let mut emitted = false;
            ReplyStream::new(stream::poll_fn(move |_| {
                if emitted {
                    panic!("agent blew up");
                }
                emitted = true;
                std::task::Poll::Ready(Some(Ok(ChatMessage::new("first"))))
            }))
        }
    }

    #[tokio::test]
    async fn fragments_pass_through_in_order() -> anyhow::Result<()> {
        let agent = Arc::new(Scripted {
            id: "scripted",
            fragments: vec!["a", "b", "c"],
        });

        let fragments: Vec<_> = guarded_reply(agent, Vec::new(), "test").collect().await;
        let texts = fragments
            .into_iter()
            .map(|fragment| fragment.map(ChatMessage::into_text))
            .collect::<Result<Vec<_>>>()?;

        assert_eq!(texts, ["a", "b", "c"]);
        Ok(())
    }

    #[tokio::test]
    async fn stream_ends_after_first_error() {
        let fragments: Vec<_> = guarded_reply(Arc::new(Failing), Vec::new(), "test")
            .collect()
            .await;

        assert_eq!(fragments.len(), 2);
        assert!(fragments[0].is_ok());
        assert!(fragments[1].as_ref().is_err_and(|e| e.kind() == ErrorKind::Agent));
    }

    #[tokio::test]
    async fn panics_become_errors() {
        let fragments: Vec<_> = guarded_reply(Arc::new(Panicking), Vec::new(), "test")
            .collect()
            .await;

        assert_eq!(fragments.len(), 2);
        assert!(fragments[1].is_err());
    }

    #[tokio::test]
    async fn collected_reply_is_concatenated() -> anyhow::Result<()> {
        let agent = Arc::new(EchoAgent::new("echo"));
        let text = collect_reply(agent, vec![ChatMessage::new("hello")], "test").await?;

        assert_eq!(text, "hello");
        Ok(())
    }
}
