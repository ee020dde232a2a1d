//! # oanda-rs
//!
//! A Rust client for the [OANDA v20 streaming API](https://developer.oanda.com/rest-live-v20/).
//!
//! The crate covers the two long-lived chunked-streaming endpoints — the
//! pricing stream and the account transaction stream — and the supervision
//! machinery that keeps them alive: per-stream liveness tracking, a watchdog
//! that rebuilds silently-stalled sessions, and classification of transport
//! failures into expected and unexpected kinds.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use oanda_rs::client::OandaClient;
//! use oanda_rs::stream::api::OandaStreamApi;
//! use oanda_rs::types::enums::Environment;
//! # use oanda_rs::gateway::Gateway;
//! # struct MyGateway;
//! # impl Gateway for MyGateway {
//! #     fn on_tick(&self, _: oanda_rs::types::events::QuoteUpdate) {}
//! #     fn on_order(&self, _: oanda_rs::types::events::Order) {}
//! #     fn on_trade(&self, _: oanda_rs::types::events::Trade) {}
//! #     fn write_log(&self, _: &str) {}
//! #     fn get_order(&self, _: &str) -> Option<oanda_rs::types::events::Order> { None }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> oanda_rs::error::Result<()> {
//!     let client = Arc::new(OandaClient::new("your-access-token", Environment::Practice));
//!     let api = OandaStreamApi::new(client, Arc::new(MyGateway), "101-004-1234567-001");
//!     api.subscribe("EUR_USD")?;
//!     // Quote updates now flow into MyGateway::on_tick; stalled streams are
//!     // rebuilt automatically by the watchdog.
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod stream;
pub mod types;

/// Re-export the streaming client at crate root for convenience.
pub use client::OandaClient;
/// Re-export the error type and Result alias.
pub use error::{OandaError, Result};
/// Re-export the host collaborator trait.
pub use gateway::Gateway;
/// Re-export the streaming entry point and its configuration.
pub use stream::api::{OandaStreamApi, StreamConfig, Subscription};
