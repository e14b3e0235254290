use chrono::Utc;
use sqlx::Row;
use sqlx::SqlitePool;

use crate::db::models::InteractionRecord;
use crate::error::{AppError, AppResult};

// ============================================================================
// Interaction Repository
// ============================================================================

pub struct InteractionRepository;

impl InteractionRepository {
    pub async fn find(
        pool: &SqlitePool,
        device_id: &str,
        event_id: &str,
    ) -> AppResult<Option<InteractionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT device_id, event_id, liked, attending, viewed, created_at, updated_at
            FROM interactions
            WHERE device_id = ? AND event_id = ?
            "#,
        )
        .bind(device_id)
        .bind(event_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.map(|r| InteractionRecord {
            device_id: r.get("device_id"),
            event_id: r.get("event_id"),
            liked: r.get("liked"),
            attending: r.get("attending"),
            viewed: r.get("viewed"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    /// All interaction rows for a device, used to overlay a whole feed in one
    /// query instead of one lookup per event.
    pub async fn find_by_device(
        pool: &SqlitePool,
        device_id: &str,
    ) -> AppResult<Vec<InteractionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT device_id, event_id, liked, attending, viewed, created_at, updated_at
            FROM interactions
            WHERE device_id = ?
            "#,
        )
        .bind(device_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| InteractionRecord {
                device_id: r.get("device_id"),
                event_id: r.get("event_id"),
                liked: r.get("liked"),
                attending: r.get("attending"),
                viewed: r.get("viewed"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            })
            .collect())
    }

    pub async fn upsert(pool: &SqlitePool, record: &InteractionRecord) -> AppResult<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO interactions (device_id, event_id, liked, attending, viewed, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (device_id, event_id) DO UPDATE SET
                liked = excluded.liked,
                attending = excluded.attending,
                viewed = excluded.viewed,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.device_id)
        .bind(&record.event_id)
        .bind(record.liked)
        .bind(record.attending)
        .bind(record.viewed)
        .bind(record.created_at)
        .bind(now)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    /// Flip the liked flag and return the new state.
    pub async fn toggle_like(
        pool: &SqlitePool,
        device_id: &str,
        event_id: &str,
    ) -> AppResult<bool> {
        let mut record = Self::find(pool, device_id, event_id)
            .await?
            .unwrap_or_else(|| InteractionRecord::blank(device_id, event_id));

        record.liked = !record.liked;
        Self::upsert(pool, &record).await?;
        Ok(record.liked)
    }

    /// Flip the attending flag and return the new state.
    pub async fn toggle_attend(
        pool: &SqlitePool,
        device_id: &str,
        event_id: &str,
    ) -> AppResult<bool> {
        let mut record = Self::find(pool, device_id, event_id)
            .await?
            .unwrap_or_else(|| InteractionRecord::blank(device_id, event_id));

        record.attending = !record.attending;
        Self::upsert(pool, &record).await?;
        Ok(record.attending)
    }

    /// Set the first-view flag. Returns true only the first time, so the view
    /// counter gets bumped exactly once per device.
    pub async fn mark_viewed(
        pool: &SqlitePool,
        device_id: &str,
        event_id: &str,
    ) -> AppResult<bool> {
        let mut record = Self::find(pool, device_id, event_id)
            .await?
            .unwrap_or_else(|| InteractionRecord::blank(device_id, event_id));

        if record.viewed {
            return Ok(false);
        }

        record.viewed = true;
        Self::upsert(pool, &record).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_toggle_like_round_trip() {
        let pool = test_pool().await;

        assert!(InteractionRepository::toggle_like(&pool, "dev", "e1")
            .await
            .unwrap());
        assert!(!InteractionRepository::toggle_like(&pool, "dev", "e1")
            .await
            .unwrap());

        let record = InteractionRepository::find(&pool, "dev", "e1")
            .await
            .unwrap()
            .unwrap();
        assert!(!record.liked);
    }

    #[tokio::test]
    async fn test_mark_viewed_only_once() {
        let pool = test_pool().await;

        assert!(InteractionRepository::mark_viewed(&pool, "dev", "e1")
            .await
            .unwrap());
        assert!(!InteractionRepository::mark_viewed(&pool, "dev", "e1")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_flags_are_independent_per_device() {
        let pool = test_pool().await;

        InteractionRepository::toggle_like(&pool, "dev-a", "e1")
            .await
            .unwrap();

        assert!(InteractionRepository::find(&pool, "dev-b", "e1")
            .await
            .unwrap()
            .is_none());

        let rows = InteractionRepository::find_by_device(&pool, "dev-a")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].liked);
    }
}
