//! Error types for the `oanda-rs` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, OandaError>`.
//!
//! [`OandaError`] covers:
//! - **HTTP status errors** — Unexpected status codes with response body
//! - **HTTP transport errors** — Network, TLS, timeout failures
//! - **JSON errors** — Deserialization failures
//! - **URL errors** — Malformed URL construction
//! - **Invalid arguments** — Client-side validation errors
//!
//! Transport errors carry their full cause chain; the stream supervisor's
//! [classifier](crate::stream::classify) walks that chain to separate
//! expected network conditions from unclassified failures.

/// All possible errors produced by the `oanda-rs` client.
#[derive(Debug, thiserror::Error)]
pub enum OandaError {
    /// The server returned an unexpected HTTP status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The response body text.
        body: String,
    },

    /// A network or transport-level error from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to deserialize a JSON stream record.
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error building or parsing a URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The caller provided an invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OandaError>;
