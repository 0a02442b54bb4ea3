// Engagement Repository Port (Interface)

use crate::domain::{EngagementLog, MentorRequest, Session};
use crate::error::Result;
use async_trait::async_trait;

/// Sessions, mentor requests and engagement logs attached to ventures
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    async fn insert_session(&self, session: &Session) -> Result<()>;

    /// Sessions of a venture, most recent session date first
    async fn list_sessions(&self, venture_id: &str) -> Result<Vec<Session>>;

    async fn insert_mentor_request(&self, request: &MentorRequest) -> Result<()>;

    async fn find_mentor_request(&self, id: &str) -> Result<Option<MentorRequest>>;

    async fn update_mentor_request(&self, request: &MentorRequest) -> Result<()>;

    /// Mentor requests, newest first; restricted to one mentor when given
    async fn list_mentor_requests(&self, mentor_id: Option<&str>) -> Result<Vec<MentorRequest>>;

    async fn insert_log(&self, log: &EngagementLog) -> Result<()>;

    /// Engagement logs of a venture, newest first
    async fn list_logs(&self, venture_id: &str) -> Result<Vec<EngagementLog>>;
}
