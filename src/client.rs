//! HTTP client for the OANDA v20 streaming hosts.
//!
//! [`OandaClient`] wraps [`reqwest::Client`] with bearer-token
//! authentication and implements
//! [`StreamTransport`](crate::stream::transport::StreamTransport): opening
//! a stream issues the chunked-transfer GET and decodes the response body
//! into one JSON record per non-empty line.
//!
//! Content negotiation is left to reqwest's `gzip`/`deflate` features,
//! which send `Accept-Encoding: gzip, deflate` and transparently
//! decompress the chunked body.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::error::{OandaError, Result};
use crate::stream::transport::{MessageStream, StreamRequest, StreamTransport};
use crate::types::enums::Environment;

/// Authenticated HTTP client for the OANDA streaming hosts.
///
/// The auth header value is cached at construction time to avoid
/// per-request allocation.
///
/// # Example
///
/// ```no_run
/// use oanda_rs::client::OandaClient;
/// use oanda_rs::types::enums::Environment;
///
/// let client = OandaClient::new("your-access-token", Environment::Practice);
/// ```
#[derive(Debug, Clone)]
pub struct OandaClient {
    http: reqwest::Client,
    /// Base URL for streaming requests.
    stream_base_url: String,
    /// Pre-built `Authorization: Bearer ...` value.
    auth_header: HeaderValue,
}

impl OandaClient {
    /// Create a client for the given environment's streaming host.
    pub fn new(access_token: impl AsRef<str>, environment: Environment) -> Self {
        Self::with_stream_base_url(access_token, environment.stream_host())
    }

    /// Create a client pointing at a custom streaming base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_stream_base_url(
        access_token: impl AsRef<str>,
        base_url: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .default_headers(Self::default_headers())
            .build()
            .expect("failed to build reqwest client");

        let mut auth_header =
            HeaderValue::from_str(&format!("Bearer {}", access_token.as_ref()))
                .expect("access token contains invalid header characters");
        auth_header.set_sensitive(true);

        Self {
            http,
            stream_base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth_header,
        }
    }

    /// Returns the streaming base URL.
    pub fn stream_base_url(&self) -> &str {
        &self.stream_base_url
    }

    /// Default headers applied to every request.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Issue the streaming request and wrap the body in a line decoder.
    async fn open_stream_inner(&self, request: StreamRequest) -> Result<MessageStream> {
        let url = Url::parse(&format!("{}{}", self.stream_base_url, request.path))?;
        tracing::debug!(%url, "opening streaming request");

        let resp = self
            .http
            .request(request.method, url)
            .headers(request.headers)
            .header(header::AUTHORIZATION, self.auth_header.clone())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OandaError::HttpStatus { status, body });
        }

        let body: BoxStream<'static, reqwest::Result<Bytes>> = Box::pin(resp.bytes_stream());
        Ok(Box::pin(JsonLineStream::new(body)))
    }
}

impl StreamTransport for OandaClient {
    fn open_stream(&self, request: StreamRequest) -> BoxFuture<'_, Result<MessageStream>> {
        Box::pin(self.open_stream_inner(request))
    }
}

// ---------------------------------------------------------------------------
// Line decoding
// ---------------------------------------------------------------------------

/// Decodes a chunked byte stream into newline-delimited JSON records.
///
/// Chunk boundaries do not align with record boundaries, so a partial
/// trailing line is carried over between chunks. Blank lines are skipped.
struct JsonLineStream<S> {
    inner: S,
    buf: BytesMut,
    done: bool,
}

impl<S> JsonLineStream<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            done: false,
        }
    }
}

impl<S> Stream for JsonLineStream<S>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    type Item = Result<Value>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            // Drain complete lines before pulling more bytes.
            if let Some(pos) = this.buf.iter().position(|&b| b == b'\n') {
                let line = this.buf.split_to(pos + 1);
                let line = line[..line.len() - 1].trim_ascii();
                if line.is_empty() {
                    continue;
                }
                return Poll::Ready(Some(
                    serde_json::from_slice(line).map_err(OandaError::Json),
                ));
            }

            if this.done {
                if !this.buf.is_empty() {
                    tracing::debug!(
                        bytes = this.buf.len(),
                        "discarding partial trailing line at end of stream"
                    );
                    this.buf.clear();
                }
                return Poll::Ready(None);
            }

            match this.inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    this.buf.extend_from_slice(&chunk);
                }
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(OandaError::Http(e))));
                }
                Poll::Ready(None) => {
                    this.done = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
