// SQLite Maintenance Implementation
use accelerate_core::error::{AppError, Result};
use accelerate_core::port::{Maintenance, MaintenanceStats, TimeProvider};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// SQLite maintenance implementation
pub struct SqliteMaintenance {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMaintenance {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    /// DB size in bytes (page_count * page_size)
    async fn db_size_bytes(&self) -> Result<i64> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page count: {}", e)))?;

        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page size: {}", e)))?;

        Ok(page_count * page_size)
    }

    async fn count(&self, table: &str) -> Result<i64> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Count failed: {}", e)))
    }
}

fn to_mb(bytes: i64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[async_trait]
impl Maintenance for SqliteMaintenance {
    async fn vacuum(&self) -> Result<f64> {
        info!("Running VACUUM to optimize database...");

        let size_before = to_mb(self.db_size_bytes().await?);

        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("VACUUM failed: {}", e)))?;

        let size_after = to_mb(self.db_size_bytes().await?);
        let reclaimed = (size_before - size_after).max(0.0);

        info!(
            size_before_mb = size_before,
            size_after_mb = size_after,
            reclaimed_mb = reclaimed,
            "VACUUM completed"
        );

        Ok(reclaimed)
    }

    async fn purge_expired_sessions(&self) -> Result<i64> {
        let now = self.time_provider.now_millis();

        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Session purge failed: {}", e)))?;

        let deleted = result.rows_affected() as i64;
        info!(deleted_sessions = deleted, "Expired session purge completed");

        Ok(deleted)
    }

    async fn get_stats(&self) -> Result<MaintenanceStats> {
        let db_size_bytes = self.db_size_bytes().await?;

        let profile_count = self.count("profiles").await?;
        let venture_count = self.count("ventures").await?;
        let live_session_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM auth_sessions WHERE expires_at > ?")
                .bind(self.time_provider.now_millis())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to count sessions: {}", e)))?;

        Ok(MaintenanceStats {
            db_size_mb: to_mb(db_size_bytes),
            db_size_bytes,
            profile_count,
            venture_count,
            live_session_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;
    use accelerate_core::port::time_provider::SteppingTimeProvider;
    use accelerate_core::port::MaintenanceConfig;

    async fn seed_session(pool: &SqlitePool, token: &str, expires_at: i64) {
        sqlx::query(
            "INSERT OR IGNORE INTO auth_users (id, email, password_hash, created_at) VALUES ('u-1', 'a@x.io', 'h', 0)",
        )
        .execute(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO auth_sessions (token, user_id, expires_at, created_at) VALUES (?, 'u-1', ?, 0)")
            .bind(token)
            .bind(expires_at)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_maintenance_stats() {
        let pool = test_pool().await;
        let maintenance = SqliteMaintenance::new(pool, Arc::new(SteppingTimeProvider::new(10_000, 0)));

        let stats = maintenance.get_stats().await.unwrap();

        assert!(stats.db_size_bytes > 0);
        assert_eq!(stats.profile_count, 0);
        assert_eq!(stats.venture_count, 0);
        assert_eq!(stats.live_session_count, 0);
    }

    #[tokio::test]
    async fn test_vacuum() {
        let pool = test_pool().await;
        let maintenance = SqliteMaintenance::new(pool, Arc::new(SteppingTimeProvider::new(0, 0)));

        let reclaimed = maintenance.vacuum().await.unwrap();
        assert!(reclaimed >= 0.0);
    }

    #[tokio::test]
    async fn test_purge_expired_sessions() {
        let pool = test_pool().await;
        seed_session(&pool, "old", 5_000).await;
        seed_session(&pool, "live", 50_000).await;

        let maintenance = SqliteMaintenance::new(pool, Arc::new(SteppingTimeProvider::new(10_000, 0)));
        let stats = maintenance
            .run_full_maintenance(&MaintenanceConfig::default())
            .await
            .unwrap();

        assert_eq!(stats.live_session_count, 1);
        assert_eq!(maintenance.purge_expired_sessions().await.unwrap(), 0);
    }
}
