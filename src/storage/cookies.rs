use anyhow::Result;

use super::schema::Database;
use super::types::StoredCookie;

impl Database {
    // ========================================================================
    // Cookie Operations
    // ========================================================================

    /// Get a cookie that has not expired as of `now` (unix seconds).
    ///
    /// Expired rows are treated as absent, matching browser cookie semantics,
    /// and are deleted on the way out.
    pub async fn get_cookie(&self, name: &str, now: i64) -> Result<Option<StoredCookie>> {
        let row: Option<StoredCookie> = sqlx::query_as(
            "SELECT name, value, expires_at FROM session_cookies WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(cookie) if cookie.expires_at > now => Ok(Some(cookie)),
            Some(cookie) => {
                tracing::debug!(name = %cookie.name, expires_at = cookie.expires_at, "Dropping expired cookie");
                self.remove_cookie(name).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Set a cookie value with an absolute expiry (UPSERT).
    pub async fn set_cookie(&self, name: &str, value: &str, expires_at: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO session_cookies (name, value, expires_at, updated_at)
            VALUES (?, ?, ?, datetime('now'))
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
        "#,
        )
        .bind(name)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a cookie. Returns true if a row was deleted.
    pub async fn remove_cookie(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM session_cookies WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
