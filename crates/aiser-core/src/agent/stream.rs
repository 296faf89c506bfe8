//! Cancellable, single-consumer reply stream.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{ChatMessage, Result};

/// A boxed stream of reply fragments.
pub type FragmentStream = BoxStream<'static, Result<ChatMessage>>;

/// Lazy sequence of reply fragments produced by an [`Agent`].
///
/// The stream is consumed exactly once. It carries a [`CancellationToken`]
/// that is cancelled when the stream is closed, either explicitly through
/// [`ReplyStream::close`] or implicitly when the stream is dropped (e.g. the
/// client disconnected and the transport dropped the response body). Agents
/// that produce fragments from a background task should watch the token and
/// stop once it is cancelled.
///
/// [`Agent`]: crate::Agent
#[must_use = "streams do nothing unless polled"]
pub struct ReplyStream {
    inner: Option<FragmentStream>,
    cancellation: CancellationToken,
}

impl ReplyStream {
    /// Creates a new reply stream from any fragment stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<ChatMessage>> + Send + 'static,
    {
        Self::with_cancellation(stream, CancellationToken::new())
    }

    /// Creates a new reply stream bound to an existing cancellation token.
    pub fn with_cancellation<S>(stream: S, cancellation: CancellationToken) -> Self
    where
        S: Stream<Item = Result<ChatMessage>> + Send + 'static,
    {
        Self {
            inner: Some(stream.boxed()),
            cancellation,
        }
    }

    /// Creates a reply stream that yields the given fragments in order.
    pub fn from_fragments<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = ChatMessage>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(fragments.into_iter().map(Ok)))
    }

    /// Creates a reply stream without any fragments.
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// Creates a channel-backed reply stream.
    ///
    /// The returned [`FragmentSender`] is meant to be moved into a background
    /// task. It shares the stream's cancellation token, so the producer
    /// learns about the consumer going away.
    pub fn channel(buffer: usize) -> (FragmentSender, Self) {
        let (tx, mut rx) = mpsc::channel(buffer.max(1));
        let cancellation = CancellationToken::new();

        let sender = FragmentSender {
            tx,
            cancellation: cancellation.clone(),
        };

        let stream = stream::poll_fn(move |cx| rx.poll_recv(cx));
        (sender, Self::with_cancellation(stream, cancellation))
    }

    /// Returns a new stream that yields `header` before this stream's fragments.
    ///
    /// The cancellation token is carried over.
    pub fn prepend(self, header: ChatMessage) -> Self {
        let cancellation = self.cancellation.clone();
        let stream = stream::once(async move { Ok(header) }).chain(self);
        Self::with_cancellation(stream, cancellation)
    }

    /// Returns a clone of the stream's cancellation token.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Stops the stream and releases the underlying producer.
    ///
    /// Subsequent polls yield `None`.
    pub fn close(&mut self) {
        self.cancellation.cancel();
        self.inner = None;
    }

    /// Returns `true` once the stream finished or was closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_none() || self.cancellation.is_cancelled()
    }

    /// Drains the stream and concatenates the text of every fragment.
    ///
    /// Stops at the first failed fragment.
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(fragment) = self.next().await {
            text.push_str(fragment?.text());
        }
        Ok(text)
    }
}

impl Stream for ReplyStream {
    type Item = Result<ChatMessage>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.cancellation.is_cancelled() {
            this.inner = None;
            return Poll::Ready(None);
        }

        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match inner.poll_next_unpin(cx) {
            Poll::Ready(None) => {
                this.inner = None;
                Poll::Ready(None)
            }
            other => other,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Some(inner) => inner.size_hint(),
            None => (0, Some(0)),
        }
    }
}

impl Drop for ReplyStream {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

impl fmt::Debug for ReplyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyStream")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Producer half of a channel-backed [`ReplyStream`].
#[derive(Debug, Clone)]
pub struct FragmentSender {
    tx: mpsc::Sender<Result<ChatMessage>>,
    cancellation: CancellationToken,
}

impl FragmentSender {
    /// Sends a fragment to the consumer.
    ///
    /// Returns `false` if the consumer closed the stream; the producer should
    /// stop in that case.
    pub async fn send(&self, fragment: Result<ChatMessage>) -> bool {
        if self.cancellation.is_cancelled() {
            return false;
        }

        tokio::select! {
            () = self.cancellation.cancelled() => false,
            sent = self.tx.send(fragment) => sent.is_ok(),
        }
    }

    /// Returns `true` if the consumer closed the stream.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancellation.is_cancelled() || self.tx.is_closed()
    }

    /// Completes once the consumer closed the stream.
    pub async fn closed(&self) {
        tokio::select! {
            () = self.cancellation.cancelled() => {}
            () = self.tx.closed() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn yields_fragments_in_order() -> anyhow::Result<()> {
        let stream = ReplyStream::from_fragments(["a", "b", "c"].map(ChatMessage::from));
        assert_eq!(stream.collect_text().await?, "abc");
        Ok(())
    }

    #[tokio::test]
    async fn close_stops_stream() {
        let mut stream = ReplyStream::from_fragments(["a", "b"].map(ChatMessage::from));
        let token = stream.cancellation_token();

        assert!(stream.next().await.is_some());
        stream.close();

        assert!(token.is_cancelled());
        assert!(stream.is_closed());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn drop_cancels_token() {
        let stream = ReplyStream::empty();
        let token = stream.cancellation_token();
        drop(stream);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn prepend_emits_header_first() -> anyhow::Result<()> {
        let stream = ReplyStream::from_fragments([ChatMessage::new("body")])
            .prepend(ChatMessage::new("head:"));
        assert_eq!(stream.collect_text().await?, "head:body");
        Ok(())
    }

    #[tokio::test]
    async fn collect_text_stops_at_error() {
        let stream = ReplyStream::new(stream::iter(vec![
            Ok(ChatMessage::new("a")),
            Err(Error::agent("test", "boom")),
            Ok(ChatMessage::new("b")),
        ]));
        assert!(stream.collect_text().await.is_err());
    }

    #[tokio::test]
    async fn channel_producer_observes_close() {
        let (sender, mut stream) = ReplyStream::channel(1);

        let producer = tokio::spawn(async move {
            let mut sent = 0usize;
            while sender.send(Ok(ChatMessage::new("x"))).await {
                sent += 1;
            }
            sent
        });

        assert!(stream.next().await.is_some());
        stream.close();

        let sent = tokio::time::timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer should stop after close")
            .expect("producer should not panic");
        assert!(sent >= 1);
    }
}
