//! Host collaborator interface.
//!
//! The stream supervisor does not own order or account state; it hands
//! normalized events to a host-provided [`Gateway`] and reads orders back
//! through it. The trait is object-safe so hosts can be swapped freely —
//! production trading engines and recording fakes in tests implement the
//! same surface.

use crate::types::events::{Order, QuoteUpdate, Trade};

/// Callbacks and lookups the host application provides to the stream layer.
///
/// Implementations must be cheap and non-blocking: callbacks run on the
/// stream session task, and a slow handler delays liveness bookkeeping for
/// that stream.
pub trait Gateway: Send + Sync + 'static {
    /// A normalized quote update from the pricing stream.
    fn on_tick(&self, tick: QuoteUpdate);

    /// An order snapshot: acknowledged, cancelled, or fully traded.
    fn on_order(&self, order: Order);

    /// A completed fill.
    fn on_trade(&self, trade: Trade);

    /// Operational diagnostics: connection starts, rebuild triggers,
    /// unknown discriminants, classified and unclassified errors.
    fn write_log(&self, message: &str);

    /// Look up an order by id. A miss drops the individual event and is
    /// never fatal to the stream.
    fn get_order(&self, order_id: &str) -> Option<Order>;
}
