use std::time::Duration;

use tokio::sync::watch;

use crate::error::ErrorKind;
use crate::retention::{cancellable, Purger};

/// Purge on a fixed interval until shutdown is signaled.
///
/// The first purge runs immediately. A failed purge is logged and the loop
/// waits for the next tick; there is no early retry.
pub async fn run(
    purger: Purger,
    age_hours: u32,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(
        "Retention worker started (older than {age_hours}h, every {}s)",
        interval.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        if *shutdown.borrow() {
            break;
        }

        match cancellable(purger.purge_older_than(age_hours), shutdown.clone()).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::Cancelled => {
                tracing::warn!("Purge abandoned: {e}");
                break;
            }
            Err(e) => tracing::error!("Retention worker error: {e}"),
        }
    }

    tracing::info!("Retention worker stopped");
}
