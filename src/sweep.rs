//! Background trash purge.
//!
//! A single task, spawned once from `main`, wakes on a fixed wall-clock
//! interval and hard-deletes every soft-deleted task whose `deleted_at`
//! is at or past the retention window. One sweeper per process: the
//! deletion itself is idempotent, but running it in every HTTP worker
//! would only duplicate the work.
//!
//! Projects are intentionally not swept; they stay in the trash until
//! recovered or permanently deleted by their owner.
//!
//! Sweep failures never reach a client: they are logged and the next tick
//! retries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// The instant before which a soft-deleted task is past its retention
/// window. Comparison downstream is inclusive (`deleted_at <= cutoff`).
pub fn retention_cutoff(now: DateTime<Utc>, retention: chrono::Duration) -> DateTime<Utc> {
    now - retention
}

/// Hard-deletes all tasks soft-deleted longer ago than the retention
/// window. System-wide, no owner scoping. Returns the number of rows
/// removed.
pub async fn sweep_tasks(pool: &PgPool, retention: chrono::Duration) -> Result<u64, sqlx::Error> {
    let cutoff = retention_cutoff(Utc::now(), retention);
    let result = sqlx::query("DELETE FROM tasks WHERE is_deleted = TRUE AND deleted_at <= $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Runs the sweep loop forever. Spawn with `tokio::spawn`.
pub async fn run(pool: PgPool, interval: Duration, retention: chrono::Duration) {
    log::info!(
        "Trash sweep started (every {}s, retention {} days)",
        interval.as_secs(),
        retention.num_days()
    );

    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so startup is not a sweep.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match sweep_tasks(&pool, retention).await {
            Ok(0) => log::debug!("Trash sweep: nothing to purge"),
            Ok(removed) => log::info!("Trash sweep: purged {} expired tasks", removed),
            Err(e) => log::error!("Trash sweep failed, will retry next tick: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cutoff_is_window_before_now() {
        let now = Utc::now();
        let cutoff = retention_cutoff(now, Duration::days(30));
        assert_eq!(now - cutoff, Duration::days(30));
    }

    // The boundary contract: a task deleted one second past the window is
    // purged, one second inside the window survives. The SQL comparison is
    // `deleted_at <= cutoff`, so this models exactly what the query does.
    #[test_log::test]
    fn test_retention_boundary() {
        let now = Utc::now();
        let window = Duration::days(30);
        let cutoff = retention_cutoff(now, window);

        let past_due = now - window - Duration::seconds(1);
        let not_yet_due = now - window + Duration::seconds(1);

        assert!(past_due <= cutoff);
        assert!(!(not_yet_due <= cutoff));
    }

    #[test]
    fn test_exactly_at_window_is_purged() {
        let now = Utc::now();
        let window = Duration::days(30);
        let cutoff = retention_cutoff(now, window);
        let exactly = now - window;
        assert!(exactly <= cutoff);
    }
}
