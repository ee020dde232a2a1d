//! Shared enum types for the OANDA streaming API.
//!
//! Order status variant names use `SCREAMING_SNAKE_CASE` to match the wire
//! convention of the feed, so we suppress the Rust naming lint.
#![allow(non_camel_case_types)]

use serde::{Deserialize, Serialize};

use crate::constants::{PRACTICE_STREAM_HOST, STREAM_HOST};

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Which OANDA deployment a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    /// Live trading (fxTrade).
    Live,
    /// Demo trading (fxPractice).
    Practice,
}

impl Environment {
    /// Returns the streaming host for this environment.
    pub fn stream_host(self) -> &'static str {
        match self {
            Self::Live => STREAM_HOST,
            Self::Practice => PRACTICE_STREAM_HOST,
        }
    }
}

// ---------------------------------------------------------------------------
// Order Status
// ---------------------------------------------------------------------------

/// Status of an order as reported by the transaction stream.
///
/// The feed reports fills as complete, never partial, so there is no
/// part-traded state here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Resting on the book, nothing executed yet.
    NOT_TRADED,
    /// Fully executed.
    ALL_TRADED,
    /// Cancelled before execution.
    CANCELLED,
}

// ---------------------------------------------------------------------------
// Transaction Kind
// ---------------------------------------------------------------------------

/// The closed set of transaction discriminants the normalizer dispatches on.
///
/// Anything outside this set is reported for diagnostics and dropped; it
/// never fails the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// An order was fully filled (`ORDER_FILL`).
    OrderFill,
    /// An order was accepted by the server (`MARKET_ORDER`, `LIMIT_ORDER`,
    /// `STOP_ORDER` — all treated uniformly as an acknowledgement).
    OrderAck,
    /// An order was cancelled (`ORDER_CANCEL`).
    OrderCancel,
    /// Keep-alive with no order content (`HEARTBEAT`).
    Heartbeat,
}

impl TransactionKind {
    /// Map a wire discriminant onto the closed kind set.
    ///
    /// Returns `None` for discriminants this client does not handle.
    pub fn from_discriminant(value: &str) -> Option<Self> {
        match value {
            "ORDER_FILL" => Some(Self::OrderFill),
            "MARKET_ORDER" | "LIMIT_ORDER" | "STOP_ORDER" => Some(Self::OrderAck),
            "ORDER_CANCEL" => Some(Self::OrderCancel),
            "HEARTBEAT" => Some(Self::Heartbeat),
            _ => None,
        }
    }
}
