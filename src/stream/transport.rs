//! Collaborator boundary to the HTTP streaming layer.
//!
//! The supervisor never talks to the network directly: it asks a
//! [`StreamTransport`] to open a streaming request and consumes the decoded
//! records it yields. [`OandaClient`](crate::client::OandaClient) is the
//! production implementation; tests substitute scripted fakes.

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::Result;

/// A live streaming connection: one decoded JSON record per non-empty line,
/// until the connection ends or errors.
pub type MessageStream = BoxStream<'static, Result<Value>>;

/// A streaming request to be opened against the stream host.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// HTTP method — the v20 streaming endpoints are all GETs.
    pub method: Method,
    /// Path plus query string, relative to the stream host.
    pub path: String,
    /// Extra headers beyond authentication and content negotiation.
    pub headers: HeaderMap,
}

impl StreamRequest {
    /// A GET request for the given path.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            headers: HeaderMap::new(),
        }
    }
}

/// Opens streaming connections.
///
/// Opening a stream is naturally idempotent at this layer: each call issues
/// a fresh request, and an abandoned predecessor dies on its own read
/// failure. The supervisor relies on that when it rebuilds stalled
/// sessions.
pub trait StreamTransport: Send + Sync + 'static {
    /// Open a streaming connection and yield its decoded records.
    fn open_stream(&self, request: StreamRequest) -> BoxFuture<'_, Result<MessageStream>>;
}
