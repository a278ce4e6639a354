//! Streaming accumulation
//!
//! Drains a chunk stream into the final response string while relaying
//! each chunk to a caller-supplied sink for live display.

use futures::StreamExt;

use crate::core::Result;
use crate::llm::traits::ChatStream;

/// Consume a chunk stream to completion.
///
/// Chunks are text deltas: they are concatenated in arrival order and each
/// one is handed to `on_token` before the next is awaited. A transport
/// error item aborts accumulation and propagates; whatever text arrived
/// before the error is lost to the caller, which matches a turn that
/// never completed.
pub async fn accumulate<F>(mut stream: ChatStream, mut on_token: F) -> Result<String>
where
    F: FnMut(&str),
{
    let mut full_content = String::new();

    while let Some(item) = stream.next().await {
        let chunk = item?;

        if !chunk.content.is_empty() {
            on_token(&chunk.content);
            full_content.push_str(&chunk.content);
        }

        if chunk.done {
            break;
        }
    }

    Ok(full_content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TroupeError;
    use crate::llm::traits::StreamChunk;

    fn scripted(chunks: Vec<Result<StreamChunk>>) -> ChatStream {
        Box::pin(futures::stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_accumulate_concatenates_in_order() {
        let stream = scripted(vec![
            Ok(StreamChunk::content("Hel")),
            Ok(StreamChunk::content("lo")),
            Ok(StreamChunk::done()),
        ]);

        let mut seen = Vec::new();
        let result = accumulate(stream, |t| seen.push(t.to_string())).await.unwrap();

        assert_eq!(result, "Hello");
        assert_eq!(seen, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_accumulate_stops_at_done() {
        let stream = scripted(vec![
            Ok(StreamChunk::content("a")),
            Ok(StreamChunk::done()),
            Ok(StreamChunk::content("ignored")),
        ]);

        let result = accumulate(stream, |_| {}).await.unwrap();
        assert_eq!(result, "a");
    }

    #[tokio::test]
    async fn test_accumulate_propagates_errors() {
        let stream = scripted(vec![
            Ok(StreamChunk::content("partial")),
            Err(TroupeError::api("connection reset")),
        ]);

        let result = accumulate(stream, |_| {}).await;
        assert!(matches!(result, Err(TroupeError::Api(_))));
    }
}
