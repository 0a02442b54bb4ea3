// SQLite EngagementRepository Implementation
// Sessions, mentor requests and engagement logs

use crate::error::{corrupt_column, ensure_updated, map_sqlx_error};
use accelerate_core::domain::{EngagementLog, MentorRequest, Session};
use accelerate_core::error::Result;
use accelerate_core::port::EngagementRepository;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteEngagementRepository {
    pool: SqlitePool,
}

impl SqliteEngagementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EngagementRepository for SqliteEngagementRepository {
    async fn insert_session(&self, session: &Session) -> Result<()> {
        let summary = session
            .summary
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, venture_id, session_type, conducted_by, recording_url,
                transcript, summary, session_date, duration_minutes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.venture_id)
        .bind(session.session_type.as_str())
        .bind(&session.conducted_by)
        .bind(&session.recording_url)
        .bind(&session.transcript)
        .bind(summary)
        .bind(session.session_date)
        .bind(session.duration_minutes)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list_sessions(&self, venture_id: &str) -> Result<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE venture_id = ? ORDER BY session_date DESC, rowid DESC",
        )
        .bind(venture_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_session()).collect()
    }

    async fn insert_mentor_request(&self, request: &MentorRequest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO mentor_requests (
                id, venture_id, stream_id, mentor_id, request_details,
                briefing, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(&request.venture_id)
        .bind(&request.stream_id)
        .bind(&request.mentor_id)
        .bind(&request.request_details)
        .bind(&request.briefing)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_mentor_request(&self, id: &str) -> Result<Option<MentorRequest>> {
        let row = sqlx::query_as::<_, MentorRequestRow>("SELECT * FROM mentor_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_request()).transpose()
    }

    async fn update_mentor_request(&self, request: &MentorRequest) -> Result<()> {
        let result = sqlx::query(
            "UPDATE mentor_requests SET status = ?, briefing = ?, updated_at = ? WHERE id = ?",
        )
        .bind(request.status.as_str())
        .bind(&request.briefing)
        .bind(request.updated_at)
        .bind(&request.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        ensure_updated(result, "Mentor request", &request.id)
    }

    async fn list_mentor_requests(&self, mentor_id: Option<&str>) -> Result<Vec<MentorRequest>> {
        let rows = match mentor_id {
            Some(mentor_id) => {
                sqlx::query_as::<_, MentorRequestRow>(
                    "SELECT * FROM mentor_requests WHERE mentor_id = ? ORDER BY created_at DESC, rowid DESC",
                )
                .bind(mentor_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, MentorRequestRow>(
                    "SELECT * FROM mentor_requests ORDER BY created_at DESC, rowid DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_request()).collect()
    }

    async fn insert_log(&self, log: &EngagementLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO engagement_logs (
                id, venture_id, stream_id, action_type, details, hours_consumed, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.venture_id)
        .bind(&log.stream_id)
        .bind(log.action_type.as_str())
        .bind(log.details.as_ref().map(|d| d.to_string()))
        .bind(log.hours_consumed)
        .bind(log.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list_logs(&self, venture_id: &str) -> Result<Vec<EngagementLog>> {
        let rows = sqlx::query_as::<_, LogRow>(
            "SELECT * FROM engagement_logs WHERE venture_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(venture_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_log()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    venture_id: String,
    session_type: String,
    conducted_by: String,
    recording_url: Option<String>,
    transcript: Option<String>,
    summary: Option<String>, // JSON
    session_date: i64,
    duration_minutes: Option<i64>,
    created_at: i64,
}

impl SessionRow {
    fn into_session(self) -> Result<Session> {
        let summary = self
            .summary
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| corrupt_column("sessions", "summary", e))?;

        Ok(Session {
            id: self.id,
            venture_id: self.venture_id,
            session_type: self.session_type.parse()?,
            conducted_by: self.conducted_by,
            recording_url: self.recording_url,
            transcript: self.transcript,
            summary,
            session_date: self.session_date,
            duration_minutes: self.duration_minutes,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MentorRequestRow {
    id: String,
    venture_id: String,
    stream_id: String,
    mentor_id: String,
    request_details: Option<String>,
    briefing: Option<String>,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl MentorRequestRow {
    fn into_request(self) -> Result<MentorRequest> {
        Ok(MentorRequest {
            id: self.id,
            venture_id: self.venture_id,
            stream_id: self.stream_id,
            mentor_id: self.mentor_id,
            request_details: self.request_details,
            briefing: self.briefing,
            status: self.status.parse()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LogRow {
    id: String,
    venture_id: String,
    stream_id: String,
    action_type: String,
    details: Option<String>, // JSON
    hours_consumed: i64,
    created_at: i64,
}

impl LogRow {
    fn into_log(self) -> Result<EngagementLog> {
        let details = self
            .details
            .map(|d| serde_json::from_str(&d))
            .transpose()
            .map_err(|e| corrupt_column("engagement_logs", "details", e))?;

        Ok(EngagementLog {
            id: self.id,
            venture_id: self.venture_id,
            stream_id: self.stream_id,
            action_type: self.action_type.parse()?,
            details,
            hours_consumed: self.hours_consumed,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_profile, seed_venture};
    use crate::SqliteStreamRepository;
    use accelerate_core::domain::{
        EngagementAction, MentorRequestStatus, Role, SessionSummary, SessionType, StreamDefinition,
        VentureStream,
    };
    use accelerate_core::port::StreamRepository;

    async fn setup() -> SqliteEngagementRepository {
        let pool = seed_venture("v-1").await;
        seed_profile(&pool, "m-1", Role::Mentor).await;
        SqliteStreamRepository::new(pool.clone())
            .insert_many(&[VentureStream::new("s-1", 0, "v-1", StreamDefinition::by_number(1).unwrap())])
            .await
            .unwrap();
        SqliteEngagementRepository::new(pool)
    }

    #[tokio::test]
    async fn test_sessions_with_summary() {
        let repo = setup().await;
        let session = Session {
            id: "sess-1".to_string(),
            venture_id: "v-1".to_string(),
            session_type: SessionType::MentorSession,
            conducted_by: "m-1".to_string(),
            recording_url: None,
            transcript: Some("...".to_string()),
            summary: Some(SessionSummary {
                challenges: vec!["Cash flow".to_string()],
                action_items_beneficiary: vec![],
                action_items_foundation: vec!["Intro to bank".to_string()],
            }),
            session_date: 5000,
            duration_minutes: Some(30),
            created_at: 5000,
        };
        repo.insert_session(&session).await.unwrap();
        assert_eq!(repo.list_sessions("v-1").await.unwrap(), vec![session]);
    }

    #[tokio::test]
    async fn test_mentor_requests_by_mentor() {
        let repo = setup().await;
        let mut request = MentorRequest::new("mr-1", 1000, "v-1", "s-1", "m-1");
        repo.insert_mentor_request(&request).await.unwrap();

        request.respond(MentorRequestStatus::Accepted, 2000).unwrap();
        repo.update_mentor_request(&request).await.unwrap();

        assert_eq!(repo.list_mentor_requests(Some("m-1")).await.unwrap(), vec![request.clone()]);
        assert!(repo.list_mentor_requests(Some("m-2")).await.unwrap().is_empty());
        assert_eq!(repo.find_mentor_request("mr-1").await.unwrap(), Some(request));
    }

    #[tokio::test]
    async fn test_logs_keep_details() {
        let repo = setup().await;
        let log = EngagementLog {
            id: "l-1".to_string(),
            venture_id: "v-1".to_string(),
            stream_id: "s-1".to_string(),
            action_type: EngagementAction::Connect,
            details: Some(serde_json::json!({"partner": "Bank"})),
            hours_consumed: 4,
            created_at: 1000,
        };
        repo.insert_log(&log).await.unwrap();
        assert_eq!(repo.list_logs("v-1").await.unwrap(), vec![log]);
    }
}
