// SQLite AgreementRepository Implementation

use crate::error::{corrupt_column, ensure_updated, map_sqlx_error};
use accelerate_core::domain::Agreement;
use accelerate_core::error::Result;
use accelerate_core::port::AgreementRepository;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteAgreementRepository {
    pool: SqlitePool,
}

impl SqliteAgreementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgreementRepository for SqliteAgreementRepository {
    async fn insert(&self, agreement: &Agreement) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO agreements (
                id, venture_id, total_support_hours, plan_details, terms,
                status, accepted_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&agreement.id)
        .bind(&agreement.venture_id)
        .bind(agreement.total_support_hours)
        .bind(agreement.plan_details.to_string())
        .bind(&agreement.terms)
        .bind(agreement.status.as_str())
        .bind(agreement.accepted_at)
        .bind(agreement.created_at)
        .bind(agreement.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Agreement>> {
        let row = sqlx::query_as::<_, AgreementRow>("SELECT * FROM agreements WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_agreement()).transpose()
    }

    async fn find_latest_for_venture(&self, venture_id: &str) -> Result<Option<Agreement>> {
        let row = sqlx::query_as::<_, AgreementRow>(
            "SELECT * FROM agreements WHERE venture_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )
        .bind(venture_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|r| r.into_agreement()).transpose()
    }

    async fn update(&self, agreement: &Agreement) -> Result<()> {
        let result = sqlx::query(
            "UPDATE agreements SET status = ?, accepted_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(agreement.status.as_str())
        .bind(agreement.accepted_at)
        .bind(agreement.updated_at)
        .bind(&agreement.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        ensure_updated(result, "Agreement", &agreement.id)
    }
}

#[derive(sqlx::FromRow)]
struct AgreementRow {
    id: String,
    venture_id: String,
    total_support_hours: i64,
    plan_details: String, // JSON
    terms: Option<String>,
    status: String,
    accepted_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl AgreementRow {
    fn into_agreement(self) -> Result<Agreement> {
        let plan_details = serde_json::from_str(&self.plan_details)
            .map_err(|e| corrupt_column("agreements", "plan_details", e))?;

        Ok(Agreement {
            id: self.id,
            venture_id: self.venture_id,
            total_support_hours: self.total_support_hours,
            plan_details,
            terms: self.terms,
            status: self.status.parse()?,
            accepted_at: self.accepted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seed_venture;
    use accelerate_core::domain::{
        AgreementStatus, StreamDefinition, StreamSelfStatus, SupportType, VentureStream,
    };

    #[tokio::test]
    async fn test_agreement_keeps_plan_snapshot() {
        let repo = SqliteAgreementRepository::new(seed_venture("v-1").await);

        let mut stream = VentureStream::new("s-1", 0, "v-1", StreamDefinition::by_number(3).unwrap());
        stream.assess(StreamSelfStatus::NeedHelp, Some(SupportType::Do), None);
        let mut agreement = Agreement::generate("a-1", 1000, "v-1", &[stream]);
        repo.insert(&agreement).await.unwrap();

        agreement.accept(2000).unwrap();
        repo.update(&agreement).await.unwrap();

        let found = repo.find_latest_for_venture("v-1").await.unwrap().unwrap();
        assert_eq!(found, agreement);
        assert_eq!(found.status, AgreementStatus::Accepted);
        assert_eq!(found.total_support_hours, 30);
        assert_eq!(found.plan_details["streams"][0]["support_type"], "do");
    }
}
