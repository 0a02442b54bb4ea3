// SQLite VentureRepository Implementation

use crate::error::{ensure_updated, map_sqlx_error, parse_opt};
use accelerate_core::domain::{Venture, VentureStatus};
use accelerate_core::error::Result;
use accelerate_core::port::{VentureFilter, VentureRepository};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct SqliteVentureRepository {
    pool: SqlitePool,
}

impl SqliteVentureRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VentureRepository for SqliteVentureRepository {
    async fn insert(&self, venture: &Venture) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ventures (
                id, entrepreneur_id, status, tier,
                current_product, current_segment, current_geography, current_business_model,
                venture_product, venture_segment, venture_geography, venture_business_model,
                venture_description, expected_revenue_range,
                progress_so_far, investment_willingness, resource_allocation,
                source, referrer_id, venture_partner_id, success_manager_id, overall_rag,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&venture.id)
        .bind(&venture.entrepreneur_id)
        .bind(venture.status.as_str())
        .bind(venture.tier.map(|t| t.as_str()))
        // Current business
        .bind(&venture.current_product)
        .bind(&venture.current_segment)
        .bind(&venture.current_geography)
        .bind(&venture.current_business_model)
        // Target venture
        .bind(&venture.venture_product)
        .bind(&venture.venture_segment)
        .bind(&venture.venture_geography)
        .bind(&venture.venture_business_model)
        .bind(&venture.venture_description)
        .bind(&venture.expected_revenue_range)
        // Commitment
        .bind(&venture.progress_so_far)
        .bind(&venture.investment_willingness)
        .bind(&venture.resource_allocation)
        // Assignment
        .bind(venture.source.map(|s| s.as_str()))
        .bind(&venture.referrer_id)
        .bind(&venture.venture_partner_id)
        .bind(&venture.success_manager_id)
        .bind(venture.overall_rag.map(|r| r.as_str()))
        .bind(venture.created_at)
        .bind(venture.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Venture>> {
        let row = sqlx::query_as::<_, VentureRow>("SELECT * FROM ventures WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_venture()).transpose()
    }

    async fn update(&self, venture: &Venture) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE ventures
            SET status = ?, tier = ?,
                current_product = ?, current_segment = ?, current_geography = ?, current_business_model = ?,
                venture_product = ?, venture_segment = ?, venture_geography = ?, venture_business_model = ?,
                venture_description = ?, expected_revenue_range = ?,
                progress_so_far = ?, investment_willingness = ?, resource_allocation = ?,
                source = ?, referrer_id = ?, venture_partner_id = ?, success_manager_id = ?,
                overall_rag = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(venture.status.as_str())
        .bind(venture.tier.map(|t| t.as_str()))
        .bind(&venture.current_product)
        .bind(&venture.current_segment)
        .bind(&venture.current_geography)
        .bind(&venture.current_business_model)
        .bind(&venture.venture_product)
        .bind(&venture.venture_segment)
        .bind(&venture.venture_geography)
        .bind(&venture.venture_business_model)
        .bind(&venture.venture_description)
        .bind(&venture.expected_revenue_range)
        .bind(&venture.progress_so_far)
        .bind(&venture.investment_willingness)
        .bind(&venture.resource_allocation)
        .bind(venture.source.map(|s| s.as_str()))
        .bind(&venture.referrer_id)
        .bind(&venture.venture_partner_id)
        .bind(&venture.success_manager_id)
        .bind(venture.overall_rag.map(|r| r.as_str()))
        .bind(venture.updated_at)
        .bind(&venture.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        ensure_updated(result, "Venture", &venture.id)
    }

    async fn list(&self, filter: &VentureFilter) -> Result<Vec<Venture>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM ventures WHERE 1 = 1");

        if let Some(id) = &filter.entrepreneur_id {
            query.push(" AND entrepreneur_id = ").push_bind(id.clone());
        }
        if let Some(id) = &filter.venture_partner_id {
            query.push(" AND venture_partner_id = ").push_bind(id.clone());
        }
        if let Some(id) = &filter.success_manager_id {
            query.push(" AND success_manager_id = ").push_bind(id.clone());
        }
        if !filter.statuses.is_empty() {
            query.push(" AND status IN (");
            let mut separated = query.separated(", ");
            for status in &filter.statuses {
                separated.push_bind(status.as_str());
            }
            separated.push_unseparated(")");
        }
        query.push(" ORDER BY created_at DESC, rowid DESC");

        let rows = query
            .build_query_as::<VentureRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_venture()).collect()
    }

    async fn find_latest_for_entrepreneur(&self, entrepreneur_id: &str) -> Result<Option<Venture>> {
        let row = sqlx::query_as::<_, VentureRow>(
            "SELECT * FROM ventures WHERE entrepreneur_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )
        .bind(entrepreneur_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|r| r.into_venture()).transpose()
    }

    async fn count_by_status(&self) -> Result<Vec<(VentureStatus, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM ventures GROUP BY status ORDER BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(status, n)| Ok((status.parse::<VentureStatus>()?, n)))
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct VentureRow {
    id: String,
    entrepreneur_id: String,
    status: String,
    tier: Option<String>,

    current_product: String,
    current_segment: String,
    current_geography: String,
    current_business_model: String,

    venture_product: Option<String>,
    venture_segment: Option<String>,
    venture_geography: Option<String>,
    venture_business_model: Option<String>,
    venture_description: Option<String>,
    expected_revenue_range: Option<String>,

    progress_so_far: Option<String>,
    investment_willingness: Option<String>,
    resource_allocation: Option<String>,

    source: Option<String>,
    referrer_id: Option<String>,
    venture_partner_id: Option<String>,
    success_manager_id: Option<String>,
    overall_rag: Option<String>,

    created_at: i64,
    updated_at: i64,
}

impl VentureRow {
    fn into_venture(self) -> Result<Venture> {
        Ok(Venture {
            id: self.id,
            entrepreneur_id: self.entrepreneur_id,
            status: self.status.parse()?,
            tier: parse_opt(self.tier)?,
            current_product: self.current_product,
            current_segment: self.current_segment,
            current_geography: self.current_geography,
            current_business_model: self.current_business_model,
            venture_product: self.venture_product,
            venture_segment: self.venture_segment,
            venture_geography: self.venture_geography,
            venture_business_model: self.venture_business_model,
            venture_description: self.venture_description,
            expected_revenue_range: self.expected_revenue_range,
            progress_so_far: self.progress_so_far,
            investment_willingness: self.investment_willingness,
            resource_allocation: self.resource_allocation,
            source: parse_opt(self.source)?,
            referrer_id: self.referrer_id,
            venture_partner_id: self.venture_partner_id,
            success_manager_id: self.success_manager_id,
            overall_rag: parse_opt(self.overall_rag)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
