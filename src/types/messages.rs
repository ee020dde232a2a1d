//! Raw feed message shapes.
//!
//! These structs mirror the broker's wire records and are not owned by this
//! crate's design: only the fields the normalizer reads are declared, and
//! every non-discriminant field is optional so schema drift on the broker
//! side degrades to a dropped event rather than a dead stream.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Pricing stream
// ---------------------------------------------------------------------------

/// One side of the book in a pricing message.
///
/// Prices arrive as strings; the number of decimal digits in the raw bid
/// price determines the instrument's quoted precision.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceLevel {
    /// Price as quoted, decimal string.
    pub price: String,
    /// Liquidity available at this price.
    pub liquidity: i64,
}

/// A `PRICE` record from `GET /v3/accounts/{id}/pricing/stream`.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceMessage {
    /// Wire discriminant — `"PRICE"` for quote records.
    #[serde(rename = "type")]
    pub kind: String,
    /// Instrument symbol.
    pub instrument: String,
    /// Server timestamp, RFC 3339.
    pub time: String,
    /// Best bid — the feed sends a single level.
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
    /// Best ask — the feed sends a single level.
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
}

// ---------------------------------------------------------------------------
// Transaction stream
// ---------------------------------------------------------------------------

/// A record from `GET /v3/accounts/{id}/transactions/stream`.
///
/// The `type` field selects the handling path; the id fields overlap in
/// inconsistent ways across transaction kinds (`clientOrderID` when the
/// order was placed with a client tag, otherwise `orderID` on fills and
/// `id` on cancellations).
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionMessage {
    /// Wire discriminant (`ORDER_FILL`, `MARKET_ORDER`, `HEARTBEAT`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Server-assigned transaction id.
    #[serde(default)]
    pub id: Option<String>,
    /// Client-assigned order id, when present.
    #[serde(default, rename = "clientOrderID")]
    pub client_order_id: Option<String>,
    /// Server-assigned id of the order this transaction refers to.
    #[serde(default, rename = "orderID")]
    pub order_id: Option<String>,
    /// Instrument symbol, on order-related records.
    #[serde(default)]
    pub instrument: Option<String>,
    /// Signed order size as a decimal string.
    #[serde(default)]
    pub units: Option<String>,
    /// Fill price as a decimal string. Deprecated upstream in favour of
    /// per-trade sub-records, but still populated and authoritative for
    /// whole fills, which is all this feed produces.
    #[serde(default)]
    pub price: Option<String>,
    /// Server timestamp, RFC 3339.
    #[serde(default)]
    pub time: Option<String>,
}
