// Chunked NDJSON streaming utilities
use crate::application::streaming_service::StreamMessage;
use crate::infrastructure::json_mapper::stream_message_to_json;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;

/// Create a chunked newline-delimited JSON response
pub fn chunked_json_stream<S>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = StreamMessage> + Send + 'static,
{
    let byte_stream = stream.map(serialize_chunk);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single StreamMessage to one line
fn serialize_chunk(msg: StreamMessage) -> Result<Bytes, serde_json::Error> {
    let payload = serde_json::to_vec(&stream_message_to_json(msg))?;

    let mut chunk = BytesMut::with_capacity(payload.len() + 1);
    chunk.put_slice(&payload);
    chunk.put_u8(b'\n');

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub fn stream_from_receiver(
    mut rx: tokio::sync::mpsc::Receiver<StreamMessage>,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_is_one_json_line() {
        let chunk = serialize_chunk(StreamMessage::Complete {
            resolutions: 4,
            failed: 1,
            duration_ms: 37,
        })
        .unwrap();

        assert_eq!(chunk.last(), Some(&b'\n'));
        let line = std::str::from_utf8(&chunk[..chunk.len() - 1]).unwrap();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["durationMs"], 37);
        assert_eq!(value["failed"], 1);
    }
}
