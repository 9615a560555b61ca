use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use sqlx::types::Json;
use sqlx::PgPool;

/// Minutes a token stays valid, measured against the latest issue time.
pub const TOKEN_TTL_MINUTES: i64 = 15;

/// Newest-first token list is capped here; issuing past the cap drops the
/// oldest token instead of growing without bound.
pub const MAX_ACTIVE_TOKENS: usize = 5;

/// Login identity keyed by email. At most one row per address; created on
/// the first login attempt and never deleted, only its token list cycles.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Credential {
    pub id: i64,
    /// Lowercased email address, unique.
    pub email: String,
    /// Network origin of the last login attempt.
    pub remote_addr: Option<String>,
    /// Currently valid one-time tokens, newest first.
    pub tokens: Json<Vec<i64>>,
    /// Issue time of the newest token, local time stored without timezone.
    pub when_issued: Option<NaiveDateTime>,
    /// Where to send the browser after successful validation.
    pub url: Option<String>,
}

/// Fresh one-time numeric token in the 10,000..=999,999 value space.
pub fn generate_token() -> i64 {
    fastrand::i64(10_000..1_000_000)
}

/// Prepend `token`, keeping at most [`MAX_ACTIVE_TOKENS`] entries.
pub fn push_token(existing: &[i64], token: i64) -> Vec<i64> {
    let mut tokens = Vec::with_capacity(existing.len() + 1);
    tokens.push(token);
    tokens.extend_from_slice(existing);
    tokens.truncate(MAX_ACTIVE_TOKENS);
    tokens
}

impl Credential {
    pub async fn find_by_id(id: i64, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM credentials WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM credentials WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// First credential (lowest id) whose last login attempt came from
    /// this network origin, used to pre-fill the login form.
    pub async fn find_by_remote_addr(remote_addr: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM credentials WHERE remote_addr = $1 ORDER BY id LIMIT 1",
        )
        .bind(remote_addr)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Find or create the credential for an email, stamping the caller's
    /// network origin either way.
    pub async fn find_or_create(email: &str, remote_addr: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO credentials (email, remote_addr)
             VALUES ($1, $2)
             ON CONFLICT (email) DO UPDATE SET remote_addr = EXCLUDED.remote_addr
             RETURNING *",
        )
        .bind(email.to_lowercase())
        .bind(remote_addr)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Persist a freshly issued token list together with its issue time and
    /// the pending return URL.
    pub async fn record_issue(
        id: i64,
        tokens: &[i64],
        when_issued: NaiveDateTime,
        url: &str,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE credentials SET tokens = $2, when_issued = $3, url = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(Json(tokens.to_vec()))
        .bind(when_issued)
        .bind(url)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Single-use enforcement: successful validation clears the whole list,
    /// invalidating any other outstanding token.
    pub async fn clear_tokens(id: i64, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE credentials SET tokens = '[]'::jsonb WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// A token validates only while present in the list and within the
    /// TTL window of the latest issue time.
    pub fn token_valid(&self, token: i64, now: NaiveDateTime) -> bool {
        let Some(when_issued) = self.when_issued else {
            return false;
        };
        if now >= when_issued + Duration::minutes(TOKEN_TTL_MINUTES) {
            return false;
        }
        self.tokens.0.contains(&token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn credential(tokens: Vec<i64>, when_issued: Option<NaiveDateTime>) -> Credential {
        Credential {
            id: 1,
            email: "a@example.org".to_string(),
            remote_addr: Some("127.0.0.1".to_string()),
            tokens: Json(tokens),
            when_issued,
            url: Some("/".to_string()),
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 25)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn generated_tokens_stay_in_value_space() {
        for _ in 0..1000 {
            let t = generate_token();
            assert!((10_000..=999_999).contains(&t));
        }
    }

    #[test]
    fn push_token_prepends_and_caps() {
        let tokens = push_token(&[111_111, 222_222], 333_333);
        assert_eq!(tokens, vec![333_333, 111_111, 222_222]);

        let full: Vec<i64> = (0..MAX_ACTIVE_TOKENS as i64).collect();
        let capped = push_token(&full, 999_999);
        assert_eq!(capped.len(), MAX_ACTIVE_TOKENS);
        assert_eq!(capped[0], 999_999);
        // Oldest token dropped.
        assert!(!capped.contains(&(MAX_ACTIVE_TOKENS as i64 - 1)));
    }

    #[test]
    fn token_valid_inside_window() {
        let c = credential(vec![123_456], Some(at(12, 0)));
        assert!(c.token_valid(123_456, at(12, 14)));
    }

    #[test]
    fn token_invalid_at_and_past_fifteen_minutes() {
        let c = credential(vec![123_456], Some(at(12, 0)));
        assert!(!c.token_valid(123_456, at(12, 15)));
        assert!(!c.token_valid(123_456, at(12, 16)));
    }

    #[test]
    fn token_invalid_when_not_in_list() {
        let c = credential(vec![123_456], Some(at(12, 0)));
        assert!(!c.token_valid(654_321, at(12, 1)));
    }

    #[test]
    fn cleared_list_invalidates_all_outstanding_tokens() {
        // Two simultaneously valid tokens; validation clears the full list.
        let mut c = credential(vec![222_222, 111_111], Some(at(12, 0)));
        assert!(c.token_valid(111_111, at(12, 1)));
        c.tokens = Json(Vec::new());
        assert!(!c.token_valid(111_111, at(12, 1)));
        assert!(!c.token_valid(222_222, at(12, 1)));
    }
}
