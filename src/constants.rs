//! Constants for the OANDA v20 streaming API.
//!
//! Contains stream host URLs, the fixed per-symbol tick table, and the
//! watchdog tuning values. These are used internally by
//! [`OandaClient`](crate::client::OandaClient) and the stream supervisor,
//! but are also exported for advanced usage.

// ---------------------------------------------------------------------------
// Stream hosts
// ---------------------------------------------------------------------------

/// Streaming host for live (fxTrade) accounts.
pub const STREAM_HOST: &str = "https://stream-fxtrade.oanda.com";

/// Streaming host for practice (fxPractice) accounts.
pub const PRACTICE_STREAM_HOST: &str = "https://stream-fxpractice.oanda.com";

// ---------------------------------------------------------------------------
// Tick sizes
// ---------------------------------------------------------------------------

/// Fixed tick sizes for instruments whose quoted precision does not match
/// their tradable increment. Every other instrument derives its tick from
/// the decimal precision of the raw bid price.
pub const PRICE_TICKS: &[(&str, f64)] = &[
    ("BTCUSD", 0.5),
    ("ETHUSD", 0.05),
    ("EOSUSD", 0.001),
    ("XRPUSD", 0.0001),
];

// ---------------------------------------------------------------------------
// Watchdog tuning
// ---------------------------------------------------------------------------

/// Default tuning values for the stream watchdog.
pub mod watchdog {
    /// Seconds between watchdog polling cycles.
    pub const POLL_INTERVAL_SECS: u64 = 1;

    /// Maximum tolerated silence on a pricing stream before its session is
    /// torn down and rebuilt.
    pub const PRICE_STALENESS_SECS: u64 = 10;

    /// Maximum tolerated silence on the transaction stream before its
    /// session is torn down and rebuilt. Transactions are naturally sparse,
    /// so the threshold is wider than for prices; the server sends
    /// heartbeats that keep a healthy stream well inside it.
    pub const TRANSACTION_STALENESS_SECS: u64 = 30;
}
