//! Backup retention pruning.
//!
//! Keeps roughly the trailing month of daily snapshots plus a year of
//! 1st-of-month snapshots. Each run deletes the files whose name ends with
//! today's day-of-month (skipped when today is the 1st, protecting the
//! monthly keeps) and the file dated exactly 365 days ago.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use std::fs;
use std::path::Path;

/// Decide from the filename alone whether a backup CSV expires today.
pub fn should_prune(file_name: &str, today: NaiveDate) -> bool {
    if !file_name.ends_with(".csv") {
        return false;
    }
    // Today's own snapshot is never pruned.
    let today_suffix = format!("{}.csv", today.format("%Y%m%d"));
    if file_name.ends_with(&today_suffix) {
        return false;
    }

    let daily_suffix = format!("{}.csv", today.format("%d"));
    let yearly_suffix = format!("{}.csv", (today - Duration::days(365)).format("%Y%m%d"));
    (file_name.ends_with(&daily_suffix) && today.day() != 1) || file_name.ends_with(&yearly_suffix)
}

/// Scan the backup directory and delete expired snapshots.
pub fn prune(backup_dir: &str, today: NaiveDate) -> Result<()> {
    for entry in fs::read_dir(Path::new(backup_dir))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if should_prune(&name, today) {
            fs::remove_file(entry.path())?;
            tracing::info!("removed expired backup {}", name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backup_name(date: NaiveDate) -> String {
        format!("society_backup_{}.csv", date.format("%Y%m%d"))
    }

    #[test]
    fn prunes_day_of_month_matches_and_the_year_old_file() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        // Backups for every day of the trailing 400 days.
        let mut removed = Vec::new();
        for offset in 1..=400 {
            let date = today - Duration::days(offset);
            if should_prune(&backup_name(date), today) {
                removed.push(date);
            }
        }
        for date in &removed {
            // Only same-day-of-month files from non-month-boundary days,
            // plus the file from exactly 365 days ago.
            assert!(
                (date.day() == today.day() && date.day() != 1)
                    || *date == today - Duration::days(365),
                "unexpectedly pruned {date}"
            );
        }
        assert!(removed.contains(&(today - Duration::days(365))));
        // Monthlies within the year are retained.
        for date in &removed {
            assert!(date.day() != 1 || *date == today - Duration::days(365));
        }
    }

    #[test]
    fn todays_snapshot_is_kept() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert!(!should_prune(&backup_name(today), today));
    }

    #[test]
    fn first_of_month_skips_the_daily_rule() {
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let last_month_first = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert!(!should_prune(&backup_name(last_month_first), today));
    }

    #[test]
    fn non_backup_files_are_ignored() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert!(!should_prune("notes_20260725.txt", today));
    }
}
