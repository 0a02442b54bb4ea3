// SQLite ApprovalChainRepository Implementation

use crate::error::{ensure_updated, map_sqlx_error};
use accelerate_core::domain::{ApprovalChainItem, ApprovalStatus};
use accelerate_core::error::Result;
use accelerate_core::port::ApprovalChainRepository;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteApprovalChainRepository {
    pool: SqlitePool,
}

impl SqliteApprovalChainRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApprovalChainRepository for SqliteApprovalChainRepository {
    async fn insert_many(&self, items: &[ApprovalChainItem]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO approval_chain (
                    id, venture_id, approver_id, approver_role, sequence_number,
                    status, notes, decided_at, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.venture_id)
            .bind(&item.approver_id)
            .bind(item.approver_role.as_str())
            .bind(item.sequence_number)
            .bind(item.status.as_str())
            .bind(&item.notes)
            .bind(item.decided_at)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ApprovalChainItem>> {
        let row = sqlx::query_as::<_, ChainRow>("SELECT * FROM approval_chain WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_item()).transpose()
    }

    async fn list_for_venture(&self, venture_id: &str) -> Result<Vec<ApprovalChainItem>> {
        let rows = sqlx::query_as::<_, ChainRow>(
            "SELECT * FROM approval_chain WHERE venture_id = ? ORDER BY sequence_number ASC",
        )
        .bind(venture_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_item()).collect()
    }

    async fn update(&self, item: &ApprovalChainItem) -> Result<()> {
        let result = sqlx::query(
            "UPDATE approval_chain SET status = ?, notes = ?, decided_at = ? WHERE id = ?",
        )
        .bind(item.status.as_str())
        .bind(&item.notes)
        .bind(item.decided_at)
        .bind(&item.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        ensure_updated(result, "Approval item", &item.id)
    }

    async fn list_pending_for_approver(&self, approver_id: &str) -> Result<Vec<ApprovalChainItem>> {
        let rows = sqlx::query_as::<_, ChainRow>(
            r#"
            SELECT * FROM approval_chain
            WHERE approver_id = ? AND status = ?
            ORDER BY created_at ASC, sequence_number ASC
            "#,
        )
        .bind(approver_id)
        .bind(ApprovalStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_item()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct ChainRow {
    id: String,
    venture_id: String,
    approver_id: String,
    approver_role: String,
    sequence_number: i32,
    status: String,
    notes: Option<String>,
    decided_at: Option<i64>,
    created_at: i64,
}

impl ChainRow {
    fn into_item(self) -> Result<ApprovalChainItem> {
        Ok(ApprovalChainItem {
            id: self.id,
            venture_id: self.venture_id,
            approver_id: self.approver_id,
            approver_role: self.approver_role.parse()?,
            sequence_number: self.sequence_number,
            status: self.status.parse()?,
            notes: self.notes,
            decided_at: self.decided_at,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_profile, seed_venture};
    use accelerate_core::domain::Role;

    #[tokio::test]
    async fn test_chain_roundtrip_and_pending_lookup() {
        let pool = seed_venture("v-1").await;
        seed_profile(&pool, "fh-1", Role::FieldHead).await;
        seed_profile(&pool, "sm-1", Role::SelectionManager).await;
        let repo = SqliteApprovalChainRepository::new(pool);

        let mut first = ApprovalChainItem::new("a-1", 1000, "v-1", "fh-1", Role::FieldHead, 2);
        let second = ApprovalChainItem::new("a-2", 1000, "v-1", "sm-1", Role::SelectionManager, 3);
        repo.insert_many(&[second.clone(), first.clone()]).await.unwrap();

        let chain = repo.list_for_venture("v-1").await.unwrap();
        assert_eq!(chain.iter().map(|i| i.sequence_number).collect::<Vec<_>>(), vec![2, 3]);

        first.decide(ApprovalStatus::Approved, Some("ok".to_string()), 2000).unwrap();
        repo.update(&first).await.unwrap();

        assert_eq!(repo.find_by_id("a-1").await.unwrap().unwrap(), first);
        assert!(repo.list_pending_for_approver("fh-1").await.unwrap().is_empty());
        assert_eq!(repo.list_pending_for_approver("sm-1").await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_unknown_approver_is_rejected_by_foreign_key() {
        let repo = SqliteApprovalChainRepository::new(seed_venture("v-1").await);
        let item = ApprovalChainItem::new("a-1", 0, "v-1", "ghost", Role::FieldHead, 2);
        assert!(repo.insert_many(&[item]).await.is_err());
    }
}
