//! Native newline-delimited JSON reply encoding.

use std::convert::Infallible;

use aiser_core::{ChatMessage, Result};
use axum::body::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use crate::handler::response::AgentChatFragment;
use crate::utility::tracing_targets::STREAM;

/// Stream of encoded native records, ready to be used as a response body.
pub type NativeStream = BoxStream<'static, Result<Bytes, Infallible>>;

/// Encodes one fragment as a newline-terminated JSON record.
pub fn encode_record(fragment: ChatMessage) -> serde_json::Result<Bytes> {
    let mut record = serde_json::to_vec(&AgentChatFragment::from(fragment))?;
    record.push(b'\n');
    Ok(Bytes::from(record))
}

/// Encodes every fragment of `fragments` as one record.
///
/// The stream ends at the first agent error or encoding failure, so a
/// partial record is never emitted.
pub(crate) fn encode_native<S>(fragments: S) -> NativeStream
where
    S: Stream<Item = Result<ChatMessage>> + Send + 'static,
{
    let stream = async_stream::stream! {
        futures::pin_mut!(fragments);

        while let Some(Ok(fragment)) = fragments.next().await {
            match encode_record(fragment) {
                Ok(record) => yield Ok(record),
                Err(error) => {
                    tracing::error!(
                        target: STREAM,
                        error = %error,
                        "failed to encode reply fragment"
                    );
                    return;
                }
            }
        }
    };

    stream.boxed()
}

#[cfg(test)]
mod tests {
    use aiser_core::Error;
    use futures::stream;

    use super::*;

    #[test]
    fn record_format() -> anyhow::Result<()> {
        let record = encode_record(ChatMessage::new("h"))?;
        assert_eq!(&record[..], b"{\"outputMessage\":{\"textContent\":\"h\"}}\n");
        Ok(())
    }

    #[tokio::test]
    async fn one_record_per_fragment() -> anyhow::Result<()> {
        let fragments = stream::iter(["a", "b"].map(|text| Ok(ChatMessage::new(text))));
        let records: Vec<_> = encode_native(fragments).collect().await;

        let body = records
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?
            .concat();
        assert_eq!(
            String::from_utf8(body)?,
            "{\"outputMessage\":{\"textContent\":\"a\"}}\n{\"outputMessage\":{\"textContent\":\"b\"}}\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn errors_end_the_stream() {
        let fragments = stream::iter([
            Ok(ChatMessage::new("a")),
            Err(Error::agent("agent", "boom")),
            Ok(ChatMessage::new("b")),
        ]);

        let records: Vec<_> = encode_native(fragments).collect().await;
        assert_eq!(records.len(), 1);
    }
}
