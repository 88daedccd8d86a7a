//! Session token denylist
//!
//! A revoked token is remembered only while it could still be presented:
//! each row carries the token's own expiry (Unix seconds).

use sqlx::SqlitePool;
use tracing::debug;

use crate::Result;

/// Record a revoked token; no-op when it has already expired
pub async fn revoke_token(
    pool: &SqlitePool,
    token: &str,
    expires_at: i64,
    now: i64,
) -> Result<bool> {
    if expires_at <= now {
        return Ok(false);
    }

    purge_expired(pool, now).await?;

    sqlx::query("INSERT OR REPLACE INTO revoked_tokens (token, expires_at) VALUES (?, ?)")
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;

    debug!(ttl_seconds = expires_at - now, "Session token revoked");
    Ok(true)
}

/// Whether a token is on the denylist and still within its TTL
pub async fn is_token_revoked(pool: &SqlitePool, token: &str, now: i64) -> Result<bool> {
    Ok(sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token = ? AND expires_at > ?)",
    )
    .bind(token)
    .bind(now)
    .fetch_one(pool)
    .await?)
}

/// Drop denylist rows whose TTL has elapsed
pub async fn purge_expired(pool: &SqlitePool, now: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_revocation_respects_ttl() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("revoked.db")).await.unwrap();

        assert!(revoke_token(&pool, "tok", 1_000, 900).await.unwrap());
        assert!(is_token_revoked(&pool, "tok", 950).await.unwrap());
        assert!(!is_token_revoked(&pool, "tok", 1_000).await.unwrap());
        assert!(!is_token_revoked(&pool, "other", 950).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_token_not_stored() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("revoked.db")).await.unwrap();

        assert!(!revoke_token(&pool, "old", 100, 200).await.unwrap());
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revoked_tokens")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_purge_drops_only_expired_rows() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("revoked.db")).await.unwrap();

        revoke_token(&pool, "short", 1_000, 0).await.unwrap();
        revoke_token(&pool, "long", 5_000, 0).await.unwrap();

        assert_eq!(purge_expired(&pool, 2_000).await.unwrap(), 1);
        assert!(is_token_revoked(&pool, "long", 2_000).await.unwrap());
    }
}
