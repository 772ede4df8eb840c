use bytes::{Bytes, BytesMut};
use futures::stream::{Stream, StreamExt};

/// Yields the payload of every complete `data:` line in a server-sent event
/// body. Lines split across network chunks are buffered until their `\n`
/// arrives, so multi-byte characters are only decoded once whole.
pub(crate) fn data_lines<S>(body: S) -> impl Stream<Item = Result<String, reqwest::Error>> + Send
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut buffer = BytesMut::new();

        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line = buffer.split_to(newline + 1);
                if let Some(data) = data_payload(&line) {
                    yield data;
                }
            }
        }

        // A final event without a trailing newline.
        if let Some(data) = data_payload(&buffer) {
            yield data;
        }
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?;
    Some(data.strip_prefix(' ').unwrap_or(data).to_string())
}
