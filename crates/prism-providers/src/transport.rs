//! HTTP transport on top of `reqwest`.
//!
//! One connection-pooled client shared by every provider. Authentication is
//! always `Authorization: Bearer <credential>`; adapter- and config-supplied
//! headers are added per request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::TransportError;
use crate::traits::{ChunkStream, Outbound, Transport};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// `reqwest`-backed [`Transport`].
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn post(&self, request: &Outbound) -> Result<reqwest::Response, TransportError> {
        debug!(url = %request.url, "POST");

        let response = self
            .client
            .post(&request.url)
            .bearer_auth(&request.credential)
            .headers(header_map(&request.headers))
            .json(&request.body)
            .send()
            .await
            .map_err(|e| {
                error!(url = %request.url, error = %e, "HTTP request failed");
                TransportError::Http(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(url = %request.url, status = %status, body = %body, "API error");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

/// Convert header pairs, skipping (and logging) invalid ones.
fn header_map(headers: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(val)) => {
                map.insert(name, val);
            }
            _ => warn!("Invalid header: {}", key),
        }
    }
    map
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &Outbound) -> Result<Value, TransportError> {
        let response = self.post(request).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))
    }

    async fn open_stream(&self, request: &Outbound) -> Result<Box<dyn ChunkStream>, TransportError> {
        let response = self.post(request).await?;
        Ok(Box::new(HttpChunkStream { response }))
    }
}

/// Streaming body of an in-flight response.
struct HttpChunkStream {
    response: reqwest::Response,
}

#[async_trait]
impl ChunkStream for HttpChunkStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.response
            .chunk()
            .await
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .map_err(|e| TransportError::Http(e.to_string()))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn outbound(url: String) -> Outbound {
        Outbound {
            url,
            credential: "test-key-123".into(),
            headers: vec![("x-api-key".into(), "test-key-123".into())],
            body: json!({ "model": "gpt-4o-mini", "max_tokens": 16 }),
        }
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_header_map_skips_invalid() {
        let map = header_map(&[
            ("X-App-Code".into(), "prism".into()),
            ("bad header".into(), "v".into()),
        ]);
        assert!(map.contains_key("x-app-code"));
        assert_eq!(map.len(), 1);
    }

    #[tokio::test]
    async fn test_send_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .and(header("x-api-key", "test-key-123"))
            .and(body_partial_json(json!({ "max_tokens": 16 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/chat/completions", mock_server.uri());
        let body = transport().send(&outbound(url)).await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_send_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/chat/completions", mock_server.uri());
        let err = transport().send(&outbound(url)).await.unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_invalid_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/chat/completions", mock_server.uri());
        let err = transport().send(&outbound(url)).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_send_network_error() {
        // Point to a port that's not listening
        let err = transport()
            .send(&outbound("http://127.0.0.1:1/chat/completions".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }

    #[tokio::test]
    async fn test_open_stream_reads_whole_body() {
        let mock_server = MockServer::start().await;
        let sse = "data: {\"n\":1}\n\ndata: [DONE]\n\n";

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/chat/completions", mock_server.uri());
        let mut stream = transport().open_stream(&outbound(url)).await.unwrap();

        let mut collected = Vec::new();
        while let Some(chunk) = stream.next_chunk().await.unwrap() {
            collected.extend(chunk);
        }
        assert_eq!(String::from_utf8(collected).unwrap(), sse);
    }

    #[tokio::test]
    async fn test_open_stream_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/chat/completions", mock_server.uri());
        let result = transport().open_stream(&outbound(url)).await;
        assert!(matches!(result, Err(TransportError::Status { status: 500, .. })));
    }
}
