//! Daily maintenance batch job.
//!
//! One run: prune old backups, send renewal reminders, reconcile
//! auto-renewing subscriptions against the payment provider, write a fresh
//! CSV snapshot. Steps run in order and fail fast; member mutations and the
//! snapshot share one transaction committed at the end.

pub mod export;
pub mod reconcile;
pub mod reminders;
pub mod retention;

use anyhow::Result;
use chrono::Local;

use crate::kernel::ServerDeps;

/// Advisory-lock key for the single-run guard.
const MAINTENANCE_LOCK_KEY: i64 = 0x6d61696e74; // "maint"

/// Run the daily maintenance job once.
///
/// Takes a store-level advisory lock first; a trigger arriving while a
/// prior run still holds the lock logs and returns without doing anything.
pub async fn run(deps: &ServerDeps) -> Result<()> {
    let mut lock_conn = deps.db_pool.acquire().await?;
    let locked: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
        .bind(MAINTENANCE_LOCK_KEY)
        .fetch_one(&mut *lock_conn)
        .await?;
    if !locked {
        tracing::warn!("daily maintenance already running, trigger skipped");
        return Ok(());
    }

    let result = run_locked(deps).await;

    let _ = sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(MAINTENANCE_LOCK_KEY)
        .execute(&mut *lock_conn)
        .await;
    result
}

async fn run_locked(deps: &ServerDeps) -> Result<()> {
    let today = Local::now().date_naive();
    tracing::info!("daily maintenance starting");

    retention::prune(&deps.settings.backup_dir, today)?;
    reminders::send_reminders(today, deps).await?;

    let mut tx = deps.db_pool.begin().await?;
    reconcile::reconcile_subscriptions(deps, &mut tx).await?;
    export::write_snapshot(&mut tx, &deps.settings, today).await?;
    tx.commit().await?;

    tracing::info!("daily maintenance complete");
    Ok(())
}
