//! Event normalization.
//!
//! Maps raw feed records onto the normalized domain events the host
//! consumes. Dispatch is over a closed discriminant set; unmapped
//! discriminants are reported for diagnostics and dropped, and a failed
//! order lookup drops the individual event without failing the stream.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::constants::PRICE_TICKS;
use crate::gateway::Gateway;
use crate::types::enums::{OrderStatus, TransactionKind};
use crate::types::events::{Order, QuoteUpdate, Trade};
use crate::types::messages::{PriceMessage, TransactionMessage};

// ---------------------------------------------------------------------------
// Pricing stream
// ---------------------------------------------------------------------------

/// Handle one record from the pricing stream.
///
/// Only `PRICE` records produce an event; the feed's heartbeats and any
/// other discriminant count toward liveness upstream but carry no quote.
pub(crate) fn handle_price_record(record: &Value, gateway: &dyn Gateway) {
    let kind = record.get("type").and_then(Value::as_str).unwrap_or_default();
    if kind != "PRICE" {
        return;
    }

    let msg: PriceMessage = match serde_json::from_value(record.clone()) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(error = %e, "malformed PRICE record dropped");
            return;
        }
    };

    let (Some(bid), Some(ask)) = (msg.bids.first(), msg.asks.first()) else {
        tracing::debug!(instrument = %msg.instrument, "PRICE record without best bid/ask");
        return;
    };
    let (Ok(bid_price), Ok(ask_price)) = (bid.price.parse::<f64>(), ask.price.parse::<f64>())
    else {
        tracing::warn!(instrument = %msg.instrument, "unparseable price in PRICE record");
        return;
    };

    let precision = decimal_places(&bid.price);
    let tick = tick_size(&msg.instrument, precision);
    let last_price = round_to_tick((bid_price + ask_price) / 2.0, tick);
    let volume = ((bid.liquidity + ask.liquidity) as f64 / 2.0).round() as i64;

    gateway.on_tick(QuoteUpdate {
        symbol: msg.instrument.clone(),
        time: parse_wire_time(Some(&msg.time)),
        bid_price,
        bid_volume: bid.liquidity,
        ask_price,
        ask_volume: ask.liquidity,
        last_price,
        volume,
    });
}

/// Number of digits after the decimal point in a raw price string.
fn decimal_places(raw: &str) -> u32 {
    raw.split_once('.').map_or(0, |(_, frac)| frac.len() as u32)
}

/// Tick size for an instrument: the fixed table wins where defined,
/// otherwise the quoted precision of the raw bid price decides.
fn tick_size(symbol: &str, precision: u32) -> f64 {
    PRICE_TICKS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map_or_else(|| 10f64.powi(-(precision as i32)), |(_, tick)| *tick)
}

/// Round a value to the nearest tick multiple.
fn round_to_tick(value: f64, tick: f64) -> f64 {
    let quantized = (value / tick).round() * tick;
    // Strip the binary-representation noise the multiply reintroduces.
    (quantized * 1e10).round() / 1e10
}

// ---------------------------------------------------------------------------
// Transaction stream
// ---------------------------------------------------------------------------

/// Handle one record from the transaction stream.
pub(crate) fn handle_transaction_record(record: &Value, gateway: &dyn Gateway) {
    let msg: TransactionMessage = match serde_json::from_value(record.clone()) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(error = %e, "malformed transaction record dropped");
            return;
        }
    };

    match TransactionKind::from_discriminant(&msg.kind) {
        Some(TransactionKind::OrderFill) => on_order_filled(&msg, gateway),
        Some(TransactionKind::OrderAck) => on_order_accepted(&msg, gateway),
        Some(TransactionKind::OrderCancel) => on_order_cancelled(&msg, gateway),
        // Liveness is recorded by the session for every record, so there
        // is nothing left to do for a heartbeat here.
        Some(TransactionKind::Heartbeat) => {}
        None => {
            tracing::debug!(discriminant = %msg.kind, "unmapped transaction type dropped");
            gateway.write_log(&format!("ignoring transaction type {}", msg.kind));
        }
    }
}

/// An order was fully filled. One fill is a single trade; the recorded
/// `price` field is authoritative and the filled volume is the order's
/// full resting volume.
fn on_order_filled(msg: &TransactionMessage, gateway: &dyn Gateway) {
    let Some(order_id) = msg.client_order_id.clone().or_else(|| msg.order_id.clone()) else {
        tracing::warn!("ORDER_FILL without an order id dropped");
        return;
    };
    let Some(mut order) = gateway.get_order(&order_id) else {
        tracing::warn!(order_id = %order_id, "fill for unknown order dropped");
        gateway.write_log(&format!("fill for unknown order {order_id} dropped"));
        return;
    };
    let Some(price) = msg.price.as_deref().and_then(|p| p.parse::<f64>().ok()) else {
        tracing::warn!(order_id = %order_id, "ORDER_FILL without a usable price dropped");
        return;
    };

    let time = parse_wire_time(msg.time.as_deref());
    gateway.on_trade(Trade {
        order_id: order_id.clone(),
        symbol: order.symbol.clone(),
        price,
        volume: order.volume,
        time,
    });

    order.traded = order.volume;
    order.status = OrderStatus::ALL_TRADED;
    order.time = Some(time);
    gateway.on_order(order);
}

/// A market, limit, or stop order was accepted by the server. All three
/// are treated uniformly as an acknowledgement.
fn on_order_accepted(msg: &TransactionMessage, gateway: &dyn Gateway) {
    let Some(order_id) = msg.client_order_id.clone().or_else(|| msg.id.clone()) else {
        tracing::debug!(discriminant = %msg.kind, "order acknowledgement without an id dropped");
        return;
    };
    let volume = msg
        .units
        .as_deref()
        .and_then(|u| u.parse::<f64>().ok())
        .map_or(0.0, f64::abs);

    gateway.on_order(Order {
        order_id,
        symbol: msg.instrument.clone().unwrap_or_default(),
        volume,
        traded: 0.0,
        status: OrderStatus::NOT_TRADED,
        time: Some(parse_wire_time(msg.time.as_deref())),
    });
}

/// An order was cancelled before execution.
fn on_order_cancelled(msg: &TransactionMessage, gateway: &dyn Gateway) {
    let Some(order_id) = msg.client_order_id.clone().or_else(|| msg.id.clone()) else {
        tracing::warn!("ORDER_CANCEL without an order id dropped");
        return;
    };
    let Some(mut order) = gateway.get_order(&order_id) else {
        tracing::warn!(order_id = %order_id, "cancellation for unknown order dropped");
        gateway.write_log(&format!("cancellation for unknown order {order_id} dropped"));
        return;
    };

    order.status = OrderStatus::CANCELLED;
    order.time = Some(parse_wire_time(msg.time.as_deref()));
    gateway.on_order(order);
}

/// Parse a wire timestamp, falling back to the current time when the
/// record carries none.
fn parse_wire_time(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc))
}
