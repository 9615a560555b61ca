use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{PgConnection, PgPool};

use crate::domains::member::AccessLevel;

/// Subscription status written back when the provider reports the
/// subscription is no longer operational.
pub const SUBS_CANCELLED: &str = "Cancelled";

/// Member model - SQL persistence layer
///
/// Owned by the persistent store; mutated here only by maintenance
/// (subscription cancellation). Other membership-management flows live
/// outside this crate.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Member {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,

    /// Membership type; null means no active membership.
    pub membership: Option<String>,
    /// Paid-through date.
    pub paid_date: Option<NaiveDate>,
    /// Ranked access level as lowercase text, null for none.
    pub access: Option<String>,

    // Payment subscription
    /// Provider subscription id, or `Cancelled`, or null.
    pub pay_subs: Option<String>,
    /// Which provider integration handles this member.
    pub pay_source: Option<String>,
    pub pay_next: Option<NaiveDate>,
    /// Completed manual payment flag.
    pub charged: Option<bool>,

    pub modified: Option<NaiveDateTime>,
}

impl Member {
    /// Total member count; zero signals a fresh install to the access guard.
    pub async fn count(pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members")
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// All members whose email matches, case-insensitively, through the
    /// member->email mapping. A credential may resolve to several of these.
    pub async fn find_by_email_ci(email: &str, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT DISTINCT m.*
             FROM members m
             JOIN emails e ON e.member_id = m.id
             WHERE lower(e.email) = lower($1)
             ORDER BY m.id",
        )
        .bind(email)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Members in the renewal-reminder window: paid-through between
    /// `first_date` and `last_date`, an active membership type, and neither
    /// a completed manual payment nor an auto-pay subscription.
    pub async fn renewal_candidates(
        first_date: NaiveDate,
        last_date: NaiveDate,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM members
             WHERE paid_date >= $1 AND paid_date <= $2
               AND membership IS NOT NULL
               AND pay_subs IS NULL
               AND (charged IS NULL OR charged = false)
             ORDER BY id",
        )
        .bind(first_date)
        .bind(last_date)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Members with a live auto-renewing subscription to reconcile.
    pub async fn active_subscriptions(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM members
             WHERE pay_subs IS NOT NULL AND pay_subs <> $1
             ORDER BY id",
        )
        .bind(SUBS_CANCELLED)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Mark the subscription cancelled: status text, next-payment date
    /// cleared, modification time stamped. Runs on the maintenance
    /// transaction so the whole run commits together.
    pub async fn cancel_subscription(
        id: i64,
        now: NaiveDateTime,
        conn: &mut PgConnection,
    ) -> Result<()> {
        sqlx::query("UPDATE members SET pay_subs = $2, pay_next = NULL, modified = $3 WHERE id = $1")
            .bind(id)
            .bind(SUBS_CANCELLED)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Full table in id order, read on the maintenance transaction so the
    /// snapshot includes this run's mutations.
    pub async fn fetch_all_ordered(conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM members ORDER BY id")
            .fetch_all(&mut *conn)
            .await
            .map_err(Into::into)
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn access_level(&self) -> Option<AccessLevel> {
        self.access.as_deref().and_then(AccessLevel::parse)
    }

    /// Label shown on the sign-in disambiguation form.
    pub fn choice_label(&self) -> String {
        match &self.membership {
            Some(membership) => {
                let until = self
                    .paid_date
                    .map(|d| d.format("%m/%d/%Y").to_string())
                    .unwrap_or_default();
                format!("{} {} member until {}", self.name(), membership, until)
            }
            None => self.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(membership: Option<&str>, paid: Option<NaiveDate>) -> Member {
        Member {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            membership: membership.map(str::to_string),
            paid_date: paid,
            access: Some("admin".to_string()),
            pay_subs: None,
            pay_source: None,
            pay_next: None,
            charged: None,
            modified: None,
        }
    }

    #[test]
    fn choice_label_includes_membership_and_paid_date() {
        let m = member(Some("Full"), NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(m.choice_label(), "Ada Lovelace Full member until 03/01/2026");
    }

    #[test]
    fn choice_label_without_membership_is_just_the_name() {
        let m = member(None, None);
        assert_eq!(m.choice_label(), "Ada Lovelace");
    }

    #[test]
    fn access_level_parses_stored_text() {
        let m = member(None, None);
        assert_eq!(m.access_level(), Some(AccessLevel::Admin));
    }
}
