//! Normalized domain events handed to the host gateway.
//!
//! These are the only artifacts the stream normalizer produces: quote
//! updates from the pricing stream, and order / trade snapshots from the
//! transaction stream. Everything else on the wire is discarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::enums::OrderStatus;

// ---------------------------------------------------------------------------
// Quote update
// ---------------------------------------------------------------------------

/// A normalized top-of-book quote from the pricing stream.
///
/// The feed carries a single price level per side — no depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteUpdate {
    /// Instrument symbol as reported by the feed.
    pub symbol: String,
    /// Server timestamp of the quote.
    pub time: DateTime<Utc>,
    /// Best bid price.
    pub bid_price: f64,
    /// Liquidity available at the best bid.
    pub bid_volume: i64,
    /// Best ask price.
    pub ask_price: f64,
    /// Liquidity available at the best ask.
    pub ask_volume: i64,
    /// Bid/ask midpoint rounded to the instrument tick.
    pub last_price: f64,
    /// Rounded average of bid and ask liquidity.
    pub volume: i64,
}

// ---------------------------------------------------------------------------
// Order snapshot
// ---------------------------------------------------------------------------

/// A snapshot of an order's state, delivered to the host on every
/// acknowledgement, cancellation, and fill.
///
/// The host owns the order store; this client only reads orders back via
/// [`Gateway::get_order`](crate::gateway::Gateway::get_order) and hands
/// updated snapshots to
/// [`Gateway::on_order`](crate::gateway::Gateway::on_order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Client-assigned order id, falling back to the server id when the
    /// order was not placed through this client.
    pub order_id: String,
    /// Instrument symbol.
    pub symbol: String,
    /// Total resting volume.
    pub volume: f64,
    /// Volume executed so far (0 or `volume` — the feed has no partials).
    pub traded: f64,
    /// Current order status.
    pub status: OrderStatus,
    /// Timestamp of the last status transition, if known.
    pub time: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

/// A completed fill. One `ORDER_FILL` transaction is a single trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Id of the filled order.
    pub order_id: String,
    /// Instrument symbol.
    pub symbol: String,
    /// Fill price from the transaction record.
    pub price: f64,
    /// Filled volume — the order's full resting volume.
    pub volume: f64,
    /// Server timestamp of the fill.
    pub time: DateTime<Utc>,
}
