/// Thumbnail preference store - access contract and PostgreSQL implementation
use crate::error::Result;
use crate::models::{UserId, UserThumbnailPreference};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

/// Maps a user to at most one stored thumbnail reference.
///
/// Implementations must tolerate concurrent calls for different users.
/// Concurrent writes for the same user resolve last-write-wins.
#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    /// Fetch the user's preference. `Ok(None)` means the user was never seen.
    async fn get(&self, user_id: UserId) -> Result<Option<UserThumbnailPreference>>;

    /// Create or overwrite the user's thumbnail reference.
    async fn set(&self, user_id: UserId, thumbnail_reference: &str) -> Result<()>;

    /// Remove the thumbnail reference, keeping the record. No-op when unset.
    async fn clear(&self, user_id: UserId) -> Result<()>;
}

/// SQLx-based store backed by the `user_thumbnails` table
#[derive(Clone)]
pub struct PgThumbnailStore {
    pool: PgPool,
}

impl PgThumbnailStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThumbnailStore for PgThumbnailStore {
    async fn get(&self, user_id: UserId) -> Result<Option<UserThumbnailPreference>> {
        let preference = sqlx::query_as::<_, UserThumbnailPreference>(
            r#"
            SELECT user_id, thumbnail_path, updated_at
            FROM user_thumbnails
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(preference)
    }

    async fn set(&self, user_id: UserId, thumbnail_reference: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_thumbnails (user_id, thumbnail_path, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET thumbnail_path = EXCLUDED.thumbnail_path,
                updated_at = NOW()
            "#,
        )
        .bind(user_id.0)
        .bind(thumbnail_reference)
        .execute(&self.pool)
        .await?;

        debug!(user_id = %user_id, "Thumbnail preference stored");
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_thumbnails
            SET thumbnail_path = NULL,
                updated_at = NOW()
            WHERE user_id = $1 AND thumbnail_path IS NOT NULL
            "#,
        )
        .bind(user_id.0)
        .execute(&self.pool)
        .await?;

        debug!(
            user_id = %user_id,
            cleared = result.rows_affected() > 0,
            "Thumbnail preference cleared"
        );
        Ok(())
    }
}
