// SQLite StreamRepository Implementation

use crate::error::{ensure_updated, map_sqlx_error, parse_opt};
use accelerate_core::domain::{StreamDeliverable, VentureStream};
use accelerate_core::error::Result;
use accelerate_core::port::StreamRepository;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteStreamRepository {
    pool: SqlitePool,
}

impl SqliteStreamRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StreamRepository for SqliteStreamRepository {
    async fn insert_many(&self, streams: &[VentureStream]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for stream in streams {
            sqlx::query(
                r#"
                INSERT INTO venture_streams (
                    id, venture_id, stream_number, stream_name, end_deliverable,
                    self_status, support_type, support_type_other,
                    owner_name, target_quarter, rag_status, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&stream.id)
            .bind(&stream.venture_id)
            .bind(stream.stream_number)
            .bind(&stream.stream_name)
            .bind(&stream.end_deliverable)
            .bind(stream.self_status.map(|s| s.as_str()))
            .bind(stream.support_type.map(|s| s.as_str()))
            .bind(&stream.support_type_other)
            .bind(&stream.owner_name)
            .bind(&stream.target_quarter)
            .bind(stream.rag_status.map(|r| r.as_str()))
            .bind(stream.created_at)
            .bind(stream.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<VentureStream>> {
        let row = sqlx::query_as::<_, StreamRow>("SELECT * FROM venture_streams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_stream()).transpose()
    }

    async fn list_for_venture(&self, venture_id: &str) -> Result<Vec<VentureStream>> {
        let rows = sqlx::query_as::<_, StreamRow>(
            "SELECT * FROM venture_streams WHERE venture_id = ? ORDER BY stream_number ASC",
        )
        .bind(venture_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_stream()).collect()
    }

    async fn update(&self, stream: &VentureStream) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE venture_streams
            SET end_deliverable = ?, self_status = ?, support_type = ?, support_type_other = ?,
                owner_name = ?, target_quarter = ?, rag_status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&stream.end_deliverable)
        .bind(stream.self_status.map(|s| s.as_str()))
        .bind(stream.support_type.map(|s| s.as_str()))
        .bind(&stream.support_type_other)
        .bind(&stream.owner_name)
        .bind(&stream.target_quarter)
        .bind(stream.rag_status.map(|r| r.as_str()))
        .bind(stream.updated_at)
        .bind(&stream.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        ensure_updated(result, "Stream", &stream.id)
    }

    async fn insert_deliverables(&self, deliverables: &[StreamDeliverable]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for d in deliverables {
            sqlx::query(
                r#"
                INSERT INTO stream_deliverables (
                    id, stream_id, sequence_number, title, description, target_date,
                    status, is_current, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&d.id)
            .bind(&d.stream_id)
            .bind(d.sequence_number)
            .bind(&d.title)
            .bind(&d.description)
            .bind(&d.target_date)
            .bind(d.status.as_str())
            .bind(d.is_current)
            .bind(d.created_at)
            .bind(d.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_deliverables(&self, stream_id: &str) -> Result<Vec<StreamDeliverable>> {
        let rows = sqlx::query_as::<_, DeliverableRow>(
            "SELECT * FROM stream_deliverables WHERE stream_id = ? ORDER BY sequence_number ASC",
        )
        .bind(stream_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_deliverable()).collect()
    }

    async fn find_deliverable(&self, id: &str) -> Result<Option<StreamDeliverable>> {
        let row = sqlx::query_as::<_, DeliverableRow>("SELECT * FROM stream_deliverables WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_deliverable()).transpose()
    }

    async fn update_deliverable(&self, deliverable: &StreamDeliverable) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE stream_deliverables
            SET title = ?, description = ?, target_date = ?, status = ?, is_current = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&deliverable.title)
        .bind(&deliverable.description)
        .bind(&deliverable.target_date)
        .bind(deliverable.status.as_str())
        .bind(deliverable.is_current)
        .bind(deliverable.updated_at)
        .bind(&deliverable.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        ensure_updated(result, "Deliverable", &deliverable.id)
    }
}

#[derive(sqlx::FromRow)]
struct StreamRow {
    id: String,
    venture_id: String,
    stream_number: i32,
    stream_name: String,
    end_deliverable: Option<String>,
    self_status: Option<String>,
    support_type: Option<String>,
    support_type_other: Option<String>,
    owner_name: Option<String>,
    target_quarter: Option<String>,
    rag_status: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl StreamRow {
    fn into_stream(self) -> Result<VentureStream> {
        Ok(VentureStream {
            id: self.id,
            venture_id: self.venture_id,
            stream_number: self.stream_number,
            stream_name: self.stream_name,
            end_deliverable: self.end_deliverable,
            self_status: parse_opt(self.self_status)?,
            support_type: parse_opt(self.support_type)?,
            support_type_other: self.support_type_other,
            owner_name: self.owner_name,
            target_quarter: self.target_quarter,
            rag_status: parse_opt(self.rag_status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DeliverableRow {
    id: String,
    stream_id: String,
    sequence_number: i32,
    title: String,
    description: Option<String>,
    target_date: Option<String>,
    status: String,
    is_current: bool, // SQLite boolean as integer
    created_at: i64,
    updated_at: i64,
}

impl DeliverableRow {
    fn into_deliverable(self) -> Result<StreamDeliverable> {
        Ok(StreamDeliverable {
            id: self.id,
            stream_id: self.stream_id,
            sequence_number: self.sequence_number,
            title: self.title,
            description: self.description,
            target_date: self.target_date,
            status: self.status.parse()?,
            is_current: self.is_current,
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
        DeliverableStatus, RagStatus, StreamDefinition, StreamSelfStatus, SupportType,
    };

    #[tokio::test]
    async fn test_streams_roundtrip_in_stream_order() {
        let pool = seed_venture("v-1").await;
        let repo = SqliteStreamRepository::new(pool);

        let mut s2 = VentureStream::new("s-2", 1000, "v-1", StreamDefinition::by_number(2).unwrap());
        s2.assess(StreamSelfStatus::NeedHelp, Some(SupportType::Other), Some("Legal".to_string()));
        let s1 = VentureStream::new("s-1", 1000, "v-1", StreamDefinition::by_number(1).unwrap());
        repo.insert_many(&[s2.clone(), s1.clone()]).await.unwrap();

        let listed = repo.list_for_venture("v-1").await.unwrap();
        assert_eq!(listed, vec![s1, s2.clone()]);

        s2.rag_status = Some(RagStatus::Red);
        repo.update(&s2).await.unwrap();
        assert_eq!(repo.find_by_id("s-2").await.unwrap().unwrap().rag_status, Some(RagStatus::Red));
    }

    #[tokio::test]
    async fn test_duplicate_stream_number_conflicts() {
        let pool = seed_venture("v-1").await;
        let repo = SqliteStreamRepository::new(pool);
        let def = StreamDefinition::by_number(1).unwrap();

        repo.insert_many(&[VentureStream::new("s-1", 0, "v-1", def)]).await.unwrap();
        let err = repo
            .insert_many(&[VentureStream::new("s-9", 0, "v-1", def)])
            .await
            .unwrap_err();
        assert!(matches!(err, accelerate_core::AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_deliverables_roundtrip() {
        let pool = seed_venture("v-1").await;
        let repo = SqliteStreamRepository::new(pool);
        repo.insert_many(&[VentureStream::new("s-1", 0, "v-1", StreamDefinition::by_number(1).unwrap())])
            .await
            .unwrap();

        let items: Vec<StreamDeliverable> = (1..=5)
            .map(|seq| StreamDeliverable::new(format!("d-{}", seq), 0, "s-1", seq, format!("Checkpoint {}", seq)))
            .collect();
        repo.insert_deliverables(&items).await.unwrap();

        let mut first = repo.find_deliverable("d-1").await.unwrap().unwrap();
        assert!(first.is_current);
        first.status = DeliverableStatus::Completed;
        first.is_current = false;
        repo.update_deliverable(&first).await.unwrap();

        let listed = repo.list_deliverables("s-1").await.unwrap();
        assert_eq!(listed.len(), 5);
        assert_eq!(listed[0].status, DeliverableStatus::Completed);
        assert!(!listed[0].is_current);
    }
}
