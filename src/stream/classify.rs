//! Transport failure classification.
//!
//! A failed session's error is sorted into one of a fixed set of expected
//! network conditions, or left unclassified. Classification never decides
//! whether recovery happens — the watchdog rebuilds the session either way
//! — it only decides what gets surfaced: known kinds are logged quietly,
//! unknown ones are escalated so operators see unclassified conditions.

use std::fmt;
use std::io;

use crate::error::OandaError;

/// Expected transient network conditions, always safe to retry silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// Malformed chunked framing or response body.
    Protocol,
    /// The body ended before the connection was done.
    IncompleteRead,
    /// The peer dropped the connection.
    RemoteDisconnected,
    /// Timed out establishing the connection.
    ConnectTimeout,
    /// Timed out waiting for data on an established connection.
    ReadTimeout,
}

impl fmt::Display for TransientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Protocol => "protocol error",
            Self::IncompleteRead => "incomplete read",
            Self::RemoteDisconnected => "remote disconnected",
            Self::ConnectTimeout => "connect timeout",
            Self::ReadTimeout => "read timeout",
        };
        f.write_str(name)
    }
}

/// Classify a session failure by walking its error-cause chain.
///
/// Returns `None` when no link in the chain matches a known transient kind;
/// the caller still retries, but escalates the error for visibility.
pub fn classify(err: &OandaError) -> Option<TransientKind> {
    classify_chain(err)
}

/// Walk an error and its nested causes against the known transient kinds.
///
/// An I/O cause deep in the chain is more specific than a body/decode flag
/// on an outer `reqwest` link, so the walk inspects every link before
/// falling back to the protocol classification.
pub(crate) fn classify_chain(err: &(dyn std::error::Error + 'static)) -> Option<TransientKind> {
    let mut saw_protocol = false;
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(err);

    while let Some(link) = cause {
        if let Some(req) = link.downcast_ref::<reqwest::Error>() {
            if req.is_timeout() {
                return Some(if req.is_connect() {
                    TransientKind::ConnectTimeout
                } else {
                    TransientKind::ReadTimeout
                });
            }
            if req.is_body() || req.is_decode() {
                saw_protocol = true;
            }
        }

        if let Some(io_err) = link.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::UnexpectedEof => return Some(TransientKind::IncompleteRead),
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe => return Some(TransientKind::RemoteDisconnected),
                io::ErrorKind::TimedOut => return Some(TransientKind::ReadTimeout),
                _ => {}
            }
        }

        cause = link.source();
    }

    saw_protocol.then_some(TransientKind::Protocol)
}
