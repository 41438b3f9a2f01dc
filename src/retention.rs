use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use tokio::sync::watch;

use crate::db::Gateway;
use crate::error::AppError;

/// Deletes history older than a threshold in one bulk statement.
#[derive(Clone)]
pub struct Purger {
    gateway: Arc<dyn Gateway>,
}

impl Purger {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Remove every history row created more than `age_hours` ago and
    /// return how many were removed. Zero removed rows is success.
    /// No retries: the scheduler decides when to call again.
    pub async fn purge_older_than(&self, age_hours: u32) -> Result<u64, AppError> {
        if age_hours == 0 {
            return Err(AppError::Validation(
                "Retention age must be at least one hour".to_string(),
            ));
        }

        let Some(cutoff) = retention_cutoff(Utc::now(), age_hours) else {
            tracing::debug!("No history can be older than {age_hours}h, nothing to purge");
            return Ok(0);
        };

        let deleted = self
            .gateway
            .delete_histories_before(cutoff)
            .await
            .map_err(|e| {
                tracing::error!("History purge failed: {e}");
                AppError::Internal(format!("Error deleting old histories: {e}"))
            })?;

        tracing::info!("Deleted {deleted} history records older than {age_hours}h");
        Ok(deleted)
    }
}

/// Earliest instant a Postgres `timestamptz` can hold (4714-11-24 BC).
fn oldest_storable() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(-4713, 11, 24)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Instant before which history is purged, or `None` when the age reaches
/// past anything a store can hold.
pub fn retention_cutoff(now: DateTime<Utc>, age_hours: u32) -> Option<DateTime<Utc>> {
    let cutoff = TimeDelta::try_hours(i64::from(age_hours))
        .and_then(|age| now.checked_sub_signed(age))?;
    (cutoff > oldest_storable()).then_some(cutoff)
}

/// Run `fut` unless `shutdown` flips to `true` first, in which case the
/// future is dropped and `Cancelled` is returned.
pub async fn cancellable<T, F>(
    fut: F,
    mut shutdown: watch::Receiver<bool>,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    if *shutdown.borrow() {
        return Err(AppError::Cancelled("Shutdown requested".to_string()));
    }

    let stopped = async move {
        // A dropped sender can never request shutdown.
        let closed = shutdown.wait_for(|stop| *stop).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        res = fut => res,
        _ = stopped => Err(AppError::Cancelled("Shutdown requested".to_string())),
    }
}
