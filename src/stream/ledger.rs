//! Liveness ledger.
//!
//! A process-wide mapping from stream key to the instant its last record
//! was observed. Pure bookkeeping: sessions write, the watchdog reads, and
//! nothing here performs I/O.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Stream key
// ---------------------------------------------------------------------------

/// Identity under which one streaming subscription's liveness is tracked.
///
/// Pricing streams are keyed by instrument symbol; the account-wide
/// transaction stream is keyed by account id. At most one active session
/// exists per key at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamKey {
    /// A pricing stream for one instrument.
    Price(String),
    /// The transaction stream for one account.
    Transactions(String),
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Price(symbol) => write!(f, "price:{symbol}"),
            Self::Transactions(account_id) => write!(f, "transactions:{account_id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Shared map from [`StreamKey`] to last-observed-record instant.
///
/// Timestamps only ever advance ([`touch`](Self::touch) ignores writes that
/// would move a key backward), and entries are never removed — a stale
/// entry is harmless, and an absent key reads as "never seen, assume
/// fresh", which avoids false-positive rebuilds right after startup.
#[derive(Debug, Default)]
pub struct LivenessLedger {
    inner: Mutex<HashMap<StreamKey, Instant>>,
}

impl LivenessLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a stream just produced a record (or just started).
    pub fn touch(&self, key: &StreamKey) {
        let now = Instant::now();
        let mut map = self.inner.lock().expect("liveness ledger lock poisoned");
        match map.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if now > *entry.get() {
                    entry.insert(now);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }
    }

    /// How long the key has been silent, or `None` if it was never seen.
    pub fn staleness(&self, key: &StreamKey) -> Option<Duration> {
        let map = self.inner.lock().expect("liveness ledger lock poisoned");
        map.get(key).map(Instant::elapsed)
    }
}
