//! Reconnection watchdog.
//!
//! One watchdog task runs per account, started by the first successful
//! subscription. Each cycle it checks the cancellation token, sleeps one
//! poll interval, and compares every registered stream's silence against
//! its staleness threshold. A breach tears the session down and re-issues
//! the original subscription; absence of breaches is the steady state.
//!
//! Silent stalls produce no error anywhere, so this timestamp comparison
//! is the only thing that detects them. A rebuild that fails is simply
//! caught by the same comparison on a later cycle.

use std::sync::Arc;

use crate::stream::api::StreamCore;

/// Poll the liveness ledger until cancelled, rebuilding stale sessions.
pub(crate) async fn watchdog_loop(core: Arc<StreamCore>) {
    core.gateway.write_log(&format!(
        "stream watchdog running for account {}",
        core.account_id
    ));

    loop {
        tokio::select! {
            () = core.cancel.cancelled() => {
                tracing::info!(account = %core.account_id, "stream watchdog stopped");
                break;
            }
            () = tokio::time::sleep(core.config.poll_interval) => {}
        }

        for sub in core.snapshot_subscriptions() {
            let key = sub.key();
            let Some(stale_for) = core.ledger.staleness(&key) else {
                continue;
            };
            if stale_for > core.staleness_threshold(&key) {
                tracing::warn!(
                    key = %key,
                    stale_secs = stale_for.as_secs(),
                    "stream stale; rebuilding session"
                );
                core.gateway.write_log(&format!(
                    "{key} stream stale for {}s; rebuilding session",
                    stale_for.as_secs()
                ));
                StreamCore::spawn_session(&core, sub);
            }
        }
    }
}
