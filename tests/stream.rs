//! Offline integration tests for the streaming supervisor.
//!
//! A scripted [`StreamTransport`] stands in for the network and a recording
//! [`Gateway`] stands in for the host, so every property runs without
//! credentials. Timing-sensitive cases run on tokio's paused test clock:
//! sleeps auto-advance, and eleven simulated seconds of silence cost no
//! wall time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream;
use futures_util::StreamExt;
use serde_json::{Value, json};

use oanda_rs::error::Result as OandaResult;
use oanda_rs::gateway::Gateway;
use oanda_rs::stream::api::OandaStreamApi;
use oanda_rs::stream::transport::{MessageStream, StreamRequest, StreamTransport};
use oanda_rs::types::enums::OrderStatus;
use oanda_rs::types::events::{Order, QuoteUpdate, Trade};

const ACCOUNT: &str = "001-011-5838423-001";
const WIRE_TIME: &str = "2024-03-01T12:00:00.000000000Z";

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

/// What a fake connection does after opening successfully.
#[derive(Clone)]
enum Script {
    /// Yield these records, then stay open silently.
    Messages(Vec<Value>),
    /// Yield a copy of the record every interval, forever.
    Periodic(Value, Duration),
    /// Connect successfully but never yield anything.
    Silent,
}

/// Transport fake that records every opened path and serves per-endpoint
/// scripts, matched by path substring.
struct FakeTransport {
    scripts: Vec<(&'static str, Script)>,
    opens: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn new(scripts: Vec<(&'static str, Script)>) -> Arc<Self> {
        Arc::new(Self {
            scripts,
            opens: Mutex::new(Vec::new()),
        })
    }

    /// Paths of every stream opened so far, in order.
    fn opens(&self) -> Vec<String> {
        self.opens.lock().unwrap().clone()
    }

    /// How many opened paths contain the given needle.
    fn opens_matching(&self, needle: &str) -> usize {
        self.opens().iter().filter(|p| p.contains(needle)).count()
    }
}

impl StreamTransport for FakeTransport {
    fn open_stream(&self, request: StreamRequest) -> BoxFuture<'_, OandaResult<MessageStream>> {
        self.opens.lock().unwrap().push(request.path.clone());
        let script = self
            .scripts
            .iter()
            .find(|(needle, _)| request.path.contains(needle))
            .map_or(Script::Silent, |(_, script)| script.clone());
        Box::pin(async move { Ok(make_stream(script)) })
    }
}

fn make_stream(script: Script) -> MessageStream {
    match script {
        Script::Messages(records) => {
            let records: Vec<OandaResult<Value>> = records.into_iter().map(Ok).collect();
            Box::pin(stream::iter(records).chain(stream::pending()))
        }
        Script::Periodic(record, every) => {
            Box::pin(stream::unfold((record, every), |(record, every)| async move {
                tokio::time::sleep(every).await;
                let item: OandaResult<Value> = Ok(record.clone());
                Some((item, (record, every)))
            }))
        }
        Script::Silent => Box::pin(stream::pending()),
    }
}

// ---------------------------------------------------------------------------
// Recording gateway
// ---------------------------------------------------------------------------

/// Host fake: records every event and applies order snapshots to its own
/// store, the way a trading engine would.
#[derive(Default)]
struct RecordingGateway {
    ticks: Mutex<Vec<QuoteUpdate>>,
    orders: Mutex<Vec<Order>>,
    trades: Mutex<Vec<Trade>>,
    logs: Mutex<Vec<String>>,
    store: Mutex<HashMap<String, Order>>,
}

impl RecordingGateway {
    fn with_order(order: Order) -> Arc<Self> {
        let gateway = Self::default();
        gateway
            .store
            .lock()
            .unwrap()
            .insert(order.order_id.clone(), order);
        Arc::new(gateway)
    }

    fn ticks(&self) -> Vec<QuoteUpdate> {
        self.ticks.lock().unwrap().clone()
    }

    fn orders(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }

    fn trades(&self) -> Vec<Trade> {
        self.trades.lock().unwrap().clone()
    }

    fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }

    fn stored(&self, order_id: &str) -> Option<Order> {
        self.store.lock().unwrap().get(order_id).cloned()
    }
}

impl Gateway for RecordingGateway {
    fn on_tick(&self, tick: QuoteUpdate) {
        self.ticks.lock().unwrap().push(tick);
    }

    fn on_order(&self, order: Order) {
        self.store
            .lock()
            .unwrap()
            .insert(order.order_id.clone(), order.clone());
        self.orders.lock().unwrap().push(order);
    }

    fn on_trade(&self, trade: Trade) {
        self.trades.lock().unwrap().push(trade);
    }

    fn write_log(&self, message: &str) {
        self.logs.lock().unwrap().push(message.to_owned());
    }

    fn get_order(&self, order_id: &str) -> Option<Order> {
        self.store.lock().unwrap().get(order_id).cloned()
    }
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

fn price_record(bid: &str, bid_liq: i64, ask: &str, ask_liq: i64) -> Value {
    json!({
        "type": "PRICE",
        "instrument": "EURUSD",
        "time": WIRE_TIME,
        "bids": [{"price": bid, "liquidity": bid_liq}],
        "asks": [{"price": ask, "liquidity": ask_liq}],
    })
}

fn heartbeat_record() -> Value {
    json!({"type": "HEARTBEAT", "time": WIRE_TIME})
}

fn ack_record(id: &str) -> Value {
    json!({
        "type": "MARKET_ORDER",
        "id": id,
        "instrument": "EURUSD",
        "units": "100",
        "time": WIRE_TIME,
    })
}

fn resting_order(id: &str, volume: f64) -> Order {
    Order {
        order_id: id.to_owned(),
        symbol: "EURUSD".to_owned(),
        volume,
        traded: 0.0,
        status: OrderStatus::NOT_TRADED,
        time: None,
    }
}

// ---------------------------------------------------------------------------
// Pricing stream
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn price_stream_normalizes_quotes() {
    let transport = FakeTransport::new(vec![
        (
            "pricing/stream",
            Script::Messages(vec![price_record("1.10000", 10, "1.10020", 20)]),
        ),
        ("transactions/stream", Script::Silent),
    ]);
    let gateway = Arc::new(RecordingGateway::default());
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    api.subscribe("EURUSD").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let ticks = gateway.ticks();
    assert_eq!(ticks.len(), 1);
    let tick = &ticks[0];
    assert_eq!(tick.symbol, "EURUSD");
    assert_eq!(tick.bid_price, 1.10000);
    assert_eq!(tick.bid_volume, 10);
    assert_eq!(tick.ask_price, 1.10020);
    assert_eq!(tick.ask_volume, 20);
    assert!(
        (tick.last_price - 1.1001).abs() < 1e-9,
        "midpoint should round to the 5-decimal tick, got {}",
        tick.last_price
    );
    assert_eq!(tick.volume, 15);
}

#[tokio::test(start_paused = true)]
async fn non_price_records_produce_no_ticks() {
    let transport = FakeTransport::new(vec![
        (
            "pricing/stream",
            Script::Messages(vec![heartbeat_record(), price_record("1.10000", 10, "1.10020", 20)]),
        ),
        ("transactions/stream", Script::Silent),
    ]);
    let gateway = Arc::new(RecordingGateway::default());
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    api.subscribe("EURUSD").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(gateway.ticks().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn resubscribing_the_same_symbol_does_not_duplicate_events() {
    let transport = FakeTransport::new(vec![
        (
            "pricing/stream",
            Script::Messages(vec![price_record("1.10000", 10, "1.10020", 20)]),
        ),
        ("transactions/stream", Script::Silent),
    ]);
    let gateway = Arc::new(RecordingGateway::default());
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    // Same subscription twice in immediate succession: one stream key, at
    // most one live session, so each underlying message is delivered once.
    api.subscribe("EURUSD").unwrap();
    api.subscribe("EURUSD").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(gateway.ticks().len(), 1);
    assert!(transport.opens_matching("pricing/stream") >= 1);
}

// ---------------------------------------------------------------------------
// Transaction stream
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn fill_emits_trade_and_marks_order_all_traded() {
    let transport = FakeTransport::new(vec![(
        "transactions/stream",
        Script::Messages(vec![json!({
            "type": "ORDER_FILL",
            "clientOrderID": "abc",
            "orderID": "9001",
            "price": "1.2345",
            "time": WIRE_TIME,
        })]),
    )]);
    let gateway = RecordingGateway::with_order(resting_order("abc", 100.0));
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    api.subscribe_transactions().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let trades = gateway.trades();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].order_id, "abc");
    assert_eq!(trades[0].price, 1.2345);
    assert_eq!(trades[0].volume, 100.0);

    let order = gateway.stored("abc").expect("order should still exist");
    assert_eq!(order.status, OrderStatus::ALL_TRADED);
    assert_eq!(order.traded, 100.0);
    assert!(order.time.is_some());

    assert!(api.is_fully_initialized());
}

#[tokio::test(start_paused = true)]
async fn fill_for_unknown_order_is_dropped_without_killing_the_session() {
    let transport = FakeTransport::new(vec![(
        "transactions/stream",
        Script::Messages(vec![
            json!({
                "type": "ORDER_FILL",
                "clientOrderID": "ghost",
                "price": "1.2345",
                "time": WIRE_TIME,
            }),
            // Processed only if the session survived the miss.
            ack_record("17"),
        ]),
    )]);
    let gateway = Arc::new(RecordingGateway::default());
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    api.subscribe_transactions().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(gateway.trades().is_empty());
    let orders = gateway.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, "17");
    assert_eq!(orders[0].status, OrderStatus::NOT_TRADED);
    assert!(gateway.logs().iter().any(|l| l.contains("ghost")));
}

#[tokio::test(start_paused = true)]
async fn unknown_discriminant_produces_no_events() {
    let transport = FakeTransport::new(vec![(
        "transactions/stream",
        Script::Messages(vec![
            json!({"type": "DAILY_FINANCING", "id": "55", "time": WIRE_TIME}),
            ack_record("18"),
        ]),
    )]);
    let gateway = Arc::new(RecordingGateway::default());
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    api.subscribe_transactions().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(gateway.trades().is_empty());
    assert!(gateway.ticks().is_empty());
    assert_eq!(gateway.orders().len(), 1, "session must outlive the unknown record");
    assert!(gateway.logs().iter().any(|l| l.contains("DAILY_FINANCING")));
}

#[tokio::test(start_paused = true)]
async fn cancellation_stamps_time_and_status() {
    let transport = FakeTransport::new(vec![(
        "transactions/stream",
        Script::Messages(vec![json!({
            "type": "ORDER_CANCEL",
            "clientOrderID": "abc",
            "time": WIRE_TIME,
        })]),
    )]);
    let gateway = RecordingGateway::with_order(resting_order("abc", 100.0));
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    api.subscribe_transactions().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let order = gateway.stored("abc").expect("order should still exist");
    assert_eq!(order.status, OrderStatus::CANCELLED);
    assert!(order.time.is_some());
    assert!(gateway.trades().is_empty());
}

// ---------------------------------------------------------------------------
// Watchdog
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn stale_price_stream_is_rebuilt_with_original_subscription() {
    let transport = FakeTransport::new(vec![
        ("pricing/stream", Script::Silent),
        (
            "transactions/stream",
            Script::Periodic(heartbeat_record(), Duration::from_secs(5)),
        ),
    ]);
    let gateway = Arc::new(RecordingGateway::default());
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    api.subscribe("EURUSD").unwrap();
    tokio::time::sleep(Duration::from_secs(15)).await;

    let price_opens: Vec<String> = transport
        .opens()
        .into_iter()
        .filter(|p| p.contains("pricing/stream"))
        .collect();
    assert_eq!(price_opens.len(), 2, "11s of silence triggers exactly one rebuild");
    assert_eq!(
        price_opens[0], price_opens[1],
        "rebuild must reuse the original subscription parameters"
    );
    assert!(price_opens[0].contains("instruments=EURUSD"));

    // The transaction stream is kept fresh by heartbeats and is not rebuilt.
    assert_eq!(transport.opens_matching("transactions/stream"), 1);
    assert!(gateway.logs().iter().any(|l| l.contains("rebuilding")));
}

#[tokio::test(start_paused = true)]
async fn regularly_refreshed_stream_is_never_rebuilt() {
    let transport = FakeTransport::new(vec![
        (
            "pricing/stream",
            Script::Periodic(price_record("1.10000", 10, "1.10020", 20), Duration::from_secs(5)),
        ),
        ("transactions/stream", Script::Silent),
    ]);
    let gateway = Arc::new(RecordingGateway::default());
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    api.subscribe("EURUSD").unwrap();
    tokio::time::sleep(Duration::from_secs(25)).await;

    assert_eq!(
        transport.opens_matching("pricing/stream"),
        1,
        "a stream refreshed every 5s stays inside the 10s threshold"
    );
    assert!(gateway.ticks().len() >= 4);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_rebuilds() {
    let transport = FakeTransport::new(vec![
        ("pricing/stream", Script::Silent),
        ("transactions/stream", Script::Silent),
    ]);
    let gateway = Arc::new(RecordingGateway::default());
    let api = OandaStreamApi::new(transport.clone(), gateway.clone(), ACCOUNT);

    api.subscribe("EURUSD").unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    api.shutdown();
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(
        transport.opens_matching("pricing/stream"),
        1,
        "no rebuilds after shutdown, even once staleness thresholds pass"
    );
}
