//! Shared NDJSON -> [`ChatStream`] adapter.

use futures_util::{StreamExt, TryStreamExt};
use reqwest::Response;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;

use crate::error::{LlmError, Result};
use crate::provider::ChatStream;

/// Convert a newline-delimited JSON HTTP [`Response`] into a [`ChatStream`].
///
/// `handler` receives each line of the body as it arrives, and can either:
/// - return `Ok(Some(fragment))` to emit a text fragment
/// - return `Ok(None)` to skip a line
/// - return `Err(_)` to emit a stream error
pub fn chunk_stream_from_ndjson<H>(response: Response, mut handler: H) -> ChatStream
where
    H: FnMut(&str) -> Result<Option<String>> + Send + 'static,
{
    let reader = StreamReader::new(
        response
            .bytes_stream()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err)),
    );

    let stream = FramedRead::new(reader, LinesCodec::new())
        .map(move |line| {
            let line = line.map_err(|err| LlmError::Stream(err.to_string()))?;
            handler(line.as_str())
        })
        .filter_map(|result| async move {
            match result {
                Ok(Some(fragment)) => Some(Ok(fragment)),
                Ok(None) => None,
                Err(err) => Some(Err(err)),
            }
        });

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // The server must outlive the response: the body is still streaming after
    // `send()` returns.
    async fn ndjson_response(body: &str) -> (MockServer, Response) {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-ndjson")
                    .set_body_string(body.to_string()),
            )
            .mount(&mock_server)
            .await;

        let response = reqwest::Client::new()
            .get(format!("{}/chat", mock_server.uri()))
            .send()
            .await
            .expect("response");
        (mock_server, response)
    }

    #[tokio::test]
    async fn lines_are_handed_to_the_handler_in_order() {
        let (_server, response) = ndjson_response("one\ntwo\nthree\n").await;

        let mut stream = chunk_stream_from_ndjson(response, |line| Ok(Some(line.to_uppercase())));

        let mut out = Vec::new();
        while let Some(item) = stream.next().await {
            out.push(item.expect("fragment"));
        }
        assert_eq!(out, vec!["ONE", "TWO", "THREE"]);
    }

    #[tokio::test]
    async fn skipped_lines_are_filtered_out() {
        let (_server, response) = ndjson_response("keep\nskip\nkeep\n").await;

        let mut stream = chunk_stream_from_ndjson(response, |line| {
            if line == "skip" {
                return Ok(None);
            }
            Ok(Some(line.to_string()))
        });

        let mut out = Vec::new();
        while let Some(item) = stream.next().await {
            out.push(item.expect("fragment"));
        }
        assert_eq!(out, vec!["keep", "keep"]);
    }

    #[tokio::test]
    async fn final_line_without_trailing_newline_is_delivered() {
        let (_server, response) = ndjson_response("first\nlast").await;

        let mut stream = chunk_stream_from_ndjson(response, |line| Ok(Some(line.to_string())));

        let mut out = Vec::new();
        while let Some(item) = stream.next().await {
            out.push(item.expect("fragment"));
        }
        assert_eq!(out, vec!["first", "last"]);
    }

    #[tokio::test]
    async fn handler_errors_surface_as_stream_items() {
        let (_server, response) = ndjson_response("good\nbad\n").await;

        let mut stream = chunk_stream_from_ndjson(response, |line| {
            if line == "bad" {
                return Err(LlmError::Stream("boom".to_string()));
            }
            Ok(Some(line.to_string()))
        });

        assert_eq!(stream.next().await.expect("item").expect("fragment"), "good");
        assert!(stream.next().await.expect("item").is_err());
    }
}
