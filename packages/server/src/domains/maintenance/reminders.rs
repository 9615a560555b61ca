//! Renewal reminders.
//!
//! Auto-renewing subscriptions take care of themselves; legacy and student
//! memberships renew manually and get a reminder every nine days from one
//! interval before the paid-through date to two intervals after it.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::domains::member::{EmailRecord, Member};
use crate::kernel::{member_greeting, ServerDeps};

/// Reminder cadence; also the lookback/lookahead window width.
pub const REMINDER_INTERVAL_DAYS: i64 = 9;

/// A reminder goes out when the offset to the paid-through date sits on an
/// exact interval boundary within the window.
pub fn reminder_due(paid_date: NaiveDate, today: NaiveDate) -> bool {
    (paid_date - today).num_days() % REMINDER_INTERVAL_DAYS == 0
}

/// Send reminders for the members due today. The send is production-gated;
/// the log line is written either way.
pub async fn send_reminders(today: NaiveDate, deps: &ServerDeps) -> Result<()> {
    let first_date = today - Duration::days(REMINDER_INTERVAL_DAYS * 2);
    let last_date = today + Duration::days(REMINDER_INTERVAL_DAYS);
    let members = Member::renewal_candidates(first_date, last_date, &deps.db_pool).await?;

    for member in members {
        let Some(paid_date) = member.paid_date else {
            continue;
        };
        if !reminder_due(paid_date, today) {
            continue;
        }
        let Some(email) = EmailRecord::primary_email(member.id, &deps.db_pool).await? else {
            warn!("no email on file for member {}", member.id);
            continue;
        };

        let support = &deps.settings.support_email;
        let body = deps.letterhead.render(
            "Renewal Reminder",
            &[
                member_greeting(&member),
                format!(
                    "This is a friendly reminder that your {} membership expiration date \
                     is/was {}. Please renew by <a href=\"{}\">logging in</a> and selecting \
                     join/renew from the menu of choices, or cancel membership to receive \
                     no further reminders.",
                    deps.settings.org_name,
                    paid_date.format("%m/%d/%Y"),
                    deps.settings.org_domain
                ),
                "We are very grateful for your membership support and hope that you will \
                 renew!"
                    .to_string(),
                format!("If you have any questions, please contact {support}"),
            ],
        );

        if deps.settings.is_production {
            deps.mailer
                .send(&email, Some(support), support, "Renewal Reminder", &body)
                .await?;
        }
        info!("Renewal Reminder sent to {}", email);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64) -> (NaiveDate, NaiveDate) {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        (today + Duration::days(offset), today)
    }

    #[test]
    fn due_on_exact_interval_boundaries() {
        for offset in [-18, -9, 0, 9] {
            let (paid_date, today) = day(offset);
            assert!(reminder_due(paid_date, today), "offset {offset}");
        }
    }

    #[test]
    fn not_due_off_the_boundary() {
        for offset in [-17, 5] {
            let (paid_date, today) = day(offset);
            assert!(!reminder_due(paid_date, today), "offset {offset}");
        }
    }
}
