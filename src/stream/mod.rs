//! Streaming feed supervision.
//!
//! OANDA delivers market data and account activity over long-lived HTTP
//! chunked-streaming requests that can stall silently: the connection stays
//! open but stops yielding records. This module keeps those streams fresh.
//!
//! ## Components
//!
//! - [`api`] — [`OandaStreamApi`](api::OandaStreamApi), the public entry
//!   point: idempotent subscriptions, session spawning, shutdown.
//! - [`session`] — one read loop per subscription; dispatches records and
//!   records liveness, terminating (without retrying) on any failure.
//! - [`supervisor`] — the per-account watchdog: polls the liveness ledger
//!   once a second and rebuilds any session whose stream has gone quiet
//!   past its threshold.
//! - [`ledger`] — the liveness ledger mapping each stream key to the time
//!   its last record was observed.
//! - [`normalizer`] — maps raw feed records to normalized domain events.
//! - [`classify`] — sorts transport failures into known transient kinds
//!   (retried silently) and unknown ones (retried and escalated).
//! - [`transport`] — the collaborator boundary to the HTTP layer, so tests
//!   can substitute a scripted transport.
//!
//! Sessions and the watchdog cooperate only through the shared ledger and
//! through the same idempotent subscribe entry point, so concurrent stalls
//! on different streams never block each other's detection or recovery.

pub mod api;
pub mod classify;
pub mod ledger;
pub mod normalizer;
pub mod session;
pub mod supervisor;
pub mod transport;
