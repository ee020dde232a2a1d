//! Binary to connect to the OANDA practice streaming host and subscribe to
//! EUR_USD for inspecting live quote data.
//!
//! # Usage
//!
//! ```sh
//! export OANDA_ACCESS_TOKEN="your-access-token"
//! export OANDA_ACCOUNT_ID="101-004-1234567-001"
//! cargo run --bin stream_check --features cli
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use oanda_rs::client::OandaClient;
use oanda_rs::gateway::Gateway;
use oanda_rs::stream::api::OandaStreamApi;
use oanda_rs::types::enums::Environment;
use oanda_rs::types::events::{Order, QuoteUpdate, Trade};
use tokio::time;

/// Prints everything the stream layer hands to the host.
struct PrintGateway;

impl Gateway for PrintGateway {
    fn on_tick(&self, tick: QuoteUpdate) {
        println!(
            "{} {} bid {}x{} ask {}x{} last {}",
            tick.time, tick.symbol, tick.bid_price, tick.bid_volume, tick.ask_price,
            tick.ask_volume, tick.last_price
        );
    }

    fn on_order(&self, order: Order) {
        println!("order {} -> {:?}", order.order_id, order.status);
    }

    fn on_trade(&self, trade: Trade) {
        println!("trade {} {} @ {}", trade.order_id, trade.volume, trade.price);
    }

    fn write_log(&self, message: &str) {
        println!("[stream] {message}");
    }

    fn get_order(&self, _order_id: &str) -> Option<Order> {
        None
    }
}

#[tokio::main]
async fn main() -> oanda_rs::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let token =
        env::var("OANDA_ACCESS_TOKEN").expect("set OANDA_ACCESS_TOKEN env var before running");
    let account_id =
        env::var("OANDA_ACCOUNT_ID").expect("set OANDA_ACCOUNT_ID env var before running");

    println!("Connecting to the OANDA practice streaming host…");
    let client = Arc::new(OandaClient::new(&token, Environment::Practice));
    let api = OandaStreamApi::new(client, Arc::new(PrintGateway), account_id);

    println!("Subscribing to EUR_USD…");
    api.subscribe("EUR_USD")?;

    println!("Listening for 30 seconds…\n");
    time::sleep(Duration::from_secs(30)).await;

    println!("\n30 seconds elapsed — shutting down…");
    api.shutdown();
    println!("Done.");

    Ok(())
}
