//! Stream session: one read loop per subscription.
//!
//! A session owns a single streaming request/response cycle. It opens the
//! connection, fires the on-connected side effects exactly once, then
//! forwards each decoded record to the normalizer and refreshes the
//! liveness ledger. On any transport failure it classifies the error and
//! terminates — noticing a dead stream and restarting it are deliberately
//! separate jobs, and the restart belongs to the watchdog.

use std::sync::Arc;

use futures_util::StreamExt;

use crate::error::OandaError;
use crate::gateway::Gateway;
use crate::stream::api::{StreamCore, Subscription};
use crate::stream::classify::classify;
use crate::stream::ledger::StreamKey;
use crate::stream::normalizer;

/// Consume one streaming subscription until its connection ends.
pub(crate) async fn run_session(core: Arc<StreamCore>, sub: Subscription) {
    let key = sub.key();
    let request = sub.request(&core.account_id);
    tracing::debug!(key = %key, path = %request.path, "opening streaming connection");

    let mut stream = match core.transport.open_stream(request).await {
        Ok(stream) => stream,
        Err(e) => {
            report_stream_error(&key, &e, core.gateway.as_ref());
            return;
        }
    };

    StreamCore::note_connected(&core, &sub);
    tracing::info!(key = %key, "streaming connection opened");

    while let Some(item) = stream.next().await {
        match item {
            Ok(record) => {
                match &key {
                    StreamKey::Price(_) => {
                        normalizer::handle_price_record(&record, core.gateway.as_ref());
                    }
                    StreamKey::Transactions(_) => {
                        normalizer::handle_transaction_record(&record, core.gateway.as_ref());
                    }
                }
                // Every accepted record counts as liveness, heartbeats
                // included.
                core.ledger.touch(&key);
            }
            Err(e) => {
                report_stream_error(&key, &e, core.gateway.as_ref());
                return;
            }
        }
    }

    // A clean end with no error is still a dead stream; the watchdog will
    // notice the silence and rebuild.
    tracing::info!(key = %key, "streaming connection ended");
}

/// Log a session failure according to its classification. Known transient
/// kinds stay quiet; anything unclassified is escalated so operators see
/// it. Recovery is identical either way.
fn report_stream_error(key: &StreamKey, err: &OandaError, gateway: &dyn Gateway) {
    match classify(err) {
        Some(kind) => {
            tracing::debug!(key = %key, error = %err, %kind, "stream closed by known transient failure");
            gateway.write_log(&format!("{key} stream interrupted ({kind}); will be rebuilt"));
        }
        None => {
            tracing::error!(key = %key, error = %err, "stream closed by unclassified failure");
            gateway.write_log(&format!("{key} stream failed with unclassified error: {err}"));
        }
    }
}
