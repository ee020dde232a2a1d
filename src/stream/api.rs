//! Streaming API entry point.
//!
//! [`OandaStreamApi`] owns everything the stream layer shares: the
//! transport, the host gateway, the liveness ledger, the table of live
//! session tasks, and the subscription registry the watchdog rebuilds
//! from. Subscribing is idempotent — re-issuing a subscription with the
//! same parameters replaces the key's session instead of duplicating it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::constants::watchdog;
use crate::error::{OandaError, Result};
use crate::gateway::Gateway;
use crate::stream::ledger::{LivenessLedger, StreamKey};
use crate::stream::session;
use crate::stream::supervisor;
use crate::stream::transport::{StreamRequest, StreamTransport};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning for the stream watchdog.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Time between watchdog polling cycles.
    pub poll_interval: Duration,
    /// Maximum tolerated silence on a pricing stream.
    pub price_staleness: Duration,
    /// Maximum tolerated silence on the transaction stream.
    pub transaction_staleness: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(watchdog::POLL_INTERVAL_SECS),
            price_staleness: Duration::from_secs(watchdog::PRICE_STALENESS_SECS),
            transaction_staleness: Duration::from_secs(watchdog::TRANSACTION_STALENESS_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// What is being streamed. Immutable once created; rebuilding a session
/// re-issues the stored subscription with identical parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// The pricing stream for one instrument.
    Price {
        /// Instrument symbol, e.g. `"EUR_USD"`.
        symbol: String,
    },
    /// The account-wide transaction stream.
    Transactions {
        /// Account the transactions belong to.
        account_id: String,
    },
}

impl Subscription {
    /// The liveness-ledger key this subscription is tracked under.
    pub fn key(&self) -> StreamKey {
        match self {
            Self::Price { symbol } => StreamKey::Price(symbol.clone()),
            Self::Transactions { account_id } => StreamKey::Transactions(account_id.clone()),
        }
    }

    /// The streaming request that opens this subscription.
    pub(crate) fn request(&self, account_id: &str) -> StreamRequest {
        match self {
            Self::Price { symbol } => StreamRequest::get(format!(
                "/v3/accounts/{account_id}/pricing/stream?instruments={symbol}"
            )),
            Self::Transactions { account_id } => {
                StreamRequest::get(format!("/v3/accounts/{account_id}/transactions/stream"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Shared core
// ---------------------------------------------------------------------------

/// State shared between the public API, session tasks, and the watchdog.
pub(crate) struct StreamCore {
    pub(crate) transport: Arc<dyn StreamTransport>,
    pub(crate) gateway: Arc<dyn Gateway>,
    pub(crate) ledger: LivenessLedger,
    pub(crate) account_id: String,
    pub(crate) config: StreamConfig,
    pub(crate) cancel: CancellationToken,
    /// Live session task per stream key.
    sessions: Mutex<HashMap<StreamKey, JoinHandle<()>>>,
    /// Original subscription parameters per stream key, kept for rebuilds.
    subscriptions: Mutex<HashMap<StreamKey, Subscription>>,
    watchdog_started: AtomicBool,
    transactions_requested: AtomicBool,
    fully_initialized: AtomicBool,
}

impl StreamCore {
    /// Start (or restart) the session for a subscription.
    ///
    /// The previous session for the key, if any, is aborted before the
    /// replacement task is spawned, so at most one session consumes a key
    /// at any instant.
    pub(crate) fn spawn_session(core: &Arc<Self>, sub: Subscription) {
        let key = sub.key();

        if let Some(old) = core
            .sessions
            .lock()
            .expect("session table lock poisoned")
            .remove(&key)
        {
            old.abort();
        }

        core.subscriptions
            .lock()
            .expect("subscription table lock poisoned")
            .insert(key.clone(), sub.clone());

        // Subscription start counts as liveness, so a connection that opens
        // into a quiet market gets a full staleness window before the
        // watchdog considers rebuilding it.
        core.ledger.touch(&key);

        let handle = tokio::spawn(session::run_session(Arc::clone(core), sub));
        core.sessions
            .lock()
            .expect("session table lock poisoned")
            .insert(key, handle);
    }

    /// Side effects of a session's successful initial connection. Invoked
    /// exactly once per session, by the session itself.
    pub(crate) fn note_connected(core: &Arc<Self>, sub: &Subscription) {
        let key = sub.key();
        core.ledger.touch(&key);
        core.gateway.write_log(&format!("{key} stream connected"));

        match sub {
            Subscription::Price { .. } => {
                // The transaction stream rides along with the first price
                // subscription so order and fill events arrive without an
                // explicit second subscribe call.
                if !core.transactions_requested.swap(true, Ordering::SeqCst) {
                    core.gateway.write_log(&format!(
                        "subscribing transaction stream for account {}",
                        core.account_id
                    ));
                    Self::spawn_session(
                        core,
                        Subscription::Transactions {
                            account_id: core.account_id.clone(),
                        },
                    );
                }
            }
            Subscription::Transactions { .. } => {
                core.fully_initialized.store(true, Ordering::SeqCst);
            }
        }

        if !core.watchdog_started.swap(true, Ordering::SeqCst) {
            tracing::info!(account = %core.account_id, "starting stream watchdog");
            tokio::spawn(supervisor::watchdog_loop(Arc::clone(core)));
        }
    }

    /// Snapshot of every registered subscription.
    pub(crate) fn snapshot_subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions
            .lock()
            .expect("subscription table lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Silence tolerated for a key before its session is rebuilt.
    pub(crate) fn staleness_threshold(&self, key: &StreamKey) -> Duration {
        match key {
            StreamKey::Price(_) => self.config.price_staleness,
            StreamKey::Transactions(_) => self.config.transaction_staleness,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Supervised access to the OANDA streaming endpoints for one account.
///
/// Each subscription runs in its own Tokio task; a per-account watchdog
/// polls the liveness ledger once a second and rebuilds any stream that
/// has gone silent past its threshold, re-using the original subscription
/// parameters. Must be used from within a Tokio runtime.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use oanda_rs::client::OandaClient;
/// use oanda_rs::stream::api::OandaStreamApi;
/// use oanda_rs::types::enums::Environment;
/// # use oanda_rs::gateway::Gateway;
/// # struct MyGateway;
/// # impl Gateway for MyGateway {
/// #     fn on_tick(&self, _: oanda_rs::types::events::QuoteUpdate) {}
/// #     fn on_order(&self, _: oanda_rs::types::events::Order) {}
/// #     fn on_trade(&self, _: oanda_rs::types::events::Trade) {}
/// #     fn write_log(&self, _: &str) {}
/// #     fn get_order(&self, _: &str) -> Option<oanda_rs::types::events::Order> { None }
/// # }
///
/// # #[tokio::main]
/// # async fn main() -> oanda_rs::error::Result<()> {
/// let client = Arc::new(OandaClient::new("token", Environment::Practice));
/// let api = OandaStreamApi::new(client, Arc::new(MyGateway), "101-004-1234567-001");
/// api.subscribe("EUR_USD")?;
/// # Ok(())
/// # }
/// ```
pub struct OandaStreamApi {
    core: Arc<StreamCore>,
}

impl OandaStreamApi {
    /// Create a streaming API for one account with default watchdog tuning.
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        gateway: Arc<dyn Gateway>,
        account_id: impl Into<String>,
    ) -> Self {
        Self::with_config(transport, gateway, account_id, StreamConfig::default())
    }

    /// Create a streaming API with explicit watchdog tuning.
    pub fn with_config(
        transport: Arc<dyn StreamTransport>,
        gateway: Arc<dyn Gateway>,
        account_id: impl Into<String>,
        config: StreamConfig,
    ) -> Self {
        Self {
            core: Arc::new(StreamCore {
                transport,
                gateway,
                ledger: LivenessLedger::new(),
                account_id: account_id.into(),
                config,
                cancel: CancellationToken::new(),
                sessions: Mutex::new(HashMap::new()),
                subscriptions: Mutex::new(HashMap::new()),
                watchdog_started: AtomicBool::new(false),
                transactions_requested: AtomicBool::new(false),
                fully_initialized: AtomicBool::new(false),
            }),
        }
    }

    /// Subscribe to the pricing stream for an instrument.
    ///
    /// Idempotent: subscribing the same symbol again replaces its session
    /// rather than duplicating it. The first successful price connection
    /// also subscribes the account transaction stream and starts the
    /// watchdog.
    pub fn subscribe(&self, symbol: &str) -> Result<()> {
        if symbol.is_empty() {
            return Err(OandaError::InvalidArgument(
                "instrument symbol must not be empty".into(),
            ));
        }
        StreamCore::spawn_session(
            &self.core,
            Subscription::Price {
                symbol: symbol.to_owned(),
            },
        );
        Ok(())
    }

    /// Subscribe to the account-wide transaction stream.
    ///
    /// Called automatically by the first successful price subscription;
    /// exposed for hosts that want order events without any price feed.
    pub fn subscribe_transactions(&self) -> Result<()> {
        if self.core.account_id.is_empty() {
            return Err(OandaError::InvalidArgument(
                "account id must not be empty".into(),
            ));
        }
        self.core
            .transactions_requested
            .store(true, Ordering::SeqCst);
        StreamCore::spawn_session(
            &self.core,
            Subscription::Transactions {
                account_id: self.core.account_id.clone(),
            },
        );
        Ok(())
    }

    /// Whether the transaction stream has connected at least once, i.e.
    /// order and fill events are flowing for this account.
    pub fn is_fully_initialized(&self) -> bool {
        self.core.fully_initialized.load(Ordering::SeqCst)
    }

    /// Stop the watchdog and close every active stream session.
    pub fn shutdown(&self) {
        self.core.cancel.cancel();
        if let Ok(mut sessions) = self.core.sessions.lock() {
            for (_, handle) in sessions.drain() {
                handle.abort();
            }
        }
        tracing::info!(account = %self.core.account_id, "stream api shut down");
    }
}

impl Drop for OandaStreamApi {
    fn drop(&mut self) {
        self.core.cancel.cancel();
        if let Ok(mut sessions) = self.core.sessions.lock() {
            for (_, handle) in sessions.drain() {
                handle.abort();
            }
        }
    }
}
