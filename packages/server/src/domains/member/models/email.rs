use anyhow::Result;
use sqlx::PgPool;

/// Member -> email mapping. A member may have several addresses; the most
/// recently added one is the primary.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct EmailRecord {
    pub id: i64,
    pub member_id: i64,
    pub email: String,
}

impl EmailRecord {
    /// Newest address for a member; reminder and cancellation notices go here.
    pub async fn primary_email(member_id: i64, pool: &PgPool) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT email FROM emails WHERE member_id = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(member_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}
