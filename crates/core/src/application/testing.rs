// In-memory port implementations shared by the application unit tests

use super::{Ports, SessionContext};
use crate::domain::{
    Agreement, ApplicationReview, ApprovalChainItem, EngagementLog, MentorRequest, Profile, Role,
    Session, StreamDeliverable, Venture, VentureStatus, VentureStream,
};
use crate::error::{AppError, Result};
use crate::port::id_provider::SequentialIdProvider;
use crate::port::time_provider::SteppingTimeProvider;
use crate::port::{
    AgreementRepository, ApprovalChainRepository, AuthBackend, AuthSession, AuthUser,
    EngagementRepository, InMemoryDraftStore, ProfileRepository, ReviewRepository,
    SignUpMetadata, StreamRepository, TemplateContentGenerator, VentureFilter, VentureRepository,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const T0: i64 = 1_700_000_000_000;

fn upsert_by_id<T: Clone>(rows: &mut Vec<T>, row: &T, id: impl Fn(&T) -> &str) {
    match rows.iter_mut().find(|r| id(r) == id(row)) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
}

fn replace_by_id<T: Clone>(rows: &mut [T], row: &T, id: impl Fn(&T) -> &str, entity: &str) -> Result<()> {
    match rows.iter_mut().find(|r| id(r) == id(row)) {
        Some(existing) => {
            *existing = row.clone();
            Ok(())
        }
        None => Err(AppError::not_found(entity, id(row))),
    }
}

/// One struct backing every repository, with a failure switch for the
/// agreement insert.
#[derive(Default)]
pub struct TestBackend {
    pub profiles: Mutex<Vec<Profile>>,
    pub ventures: Mutex<Vec<Venture>>,
    pub streams: Mutex<Vec<VentureStream>>,
    pub deliverables: Mutex<Vec<StreamDeliverable>>,
    pub reviews: Mutex<Vec<ApplicationReview>>,
    pub chain: Mutex<Vec<ApprovalChainItem>>,
    pub agreements: Mutex<Vec<Agreement>>,
    pub sessions: Mutex<Vec<Session>>,
    pub mentor_requests: Mutex<Vec<MentorRequest>>,
    pub logs: Mutex<Vec<EngagementLog>>,
    users: Mutex<HashMap<String, (AuthUser, String)>>,
    auth_sessions: Mutex<HashMap<String, AuthSession>>,
    next_token: AtomicU64,
    pub fail_agreement_insert: AtomicBool,
}

impl TestBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ports(self: &Arc<Self>) -> Ports {
        Ports {
            profiles: self.clone(),
            ventures: self.clone(),
            streams: self.clone(),
            reviews: self.clone(),
            approvals: self.clone(),
            agreements: self.clone(),
            engagement: self.clone(),
            auth: self.clone(),
            drafts: Arc::new(InMemoryDraftStore::new()),
            content: Arc::new(TemplateContentGenerator),
            ids: Arc::new(SequentialIdProvider::new("id")),
            clock: Arc::new(SteppingTimeProvider::new(T0, 1_000)),
        }
    }

    /// Insert a profile and hand back a session context for it
    pub fn login(&self, id: &str, role: Role) -> SessionContext {
        let profile = Profile::new(id, T0, format!("{} user", role), format!("{}@example.com", id), role);
        upsert_by_id(&mut self.profiles.lock().unwrap(), &profile, |p| &p.id);
        SessionContext {
            token: format!("token-{}", id),
            expires_at: i64::MAX,
            profile,
        }
    }

    pub fn put_venture(&self, venture: &Venture) {
        upsert_by_id(&mut self.ventures.lock().unwrap(), venture, |v| &v.id);
    }

    pub fn put_streams(&self, streams: &[VentureStream]) {
        self.streams.lock().unwrap().extend_from_slice(streams);
    }

    pub fn venture(&self, id: &str) -> Venture {
        self.ventures
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .unwrap()
    }

    pub fn venture_status(&self, id: &str) -> VentureStatus {
        self.venture(id).status
    }
}

#[async_trait]
impl ProfileRepository for TestBackend {
    async fn upsert(&self, profile: &Profile) -> Result<()> {
        upsert_by_id(&mut self.profiles.lock().unwrap(), profile, |p| &p.id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn find_first_by_role(&self, role: Role) -> Result<Option<Profile>> {
        Ok(self.profiles.lock().unwrap().iter().find(|p| p.role == role).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Profile>> {
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>> {
        let profiles = self.profiles.lock().unwrap();
        Ok(Role::ALL
            .iter()
            .map(|role| (*role, profiles.iter().filter(|p| p.role == *role).count() as i64))
            .filter(|(_, n)| *n > 0)
            .collect())
    }
}

#[async_trait]
impl VentureRepository for TestBackend {
    async fn insert(&self, venture: &Venture) -> Result<()> {
        self.ventures.lock().unwrap().push(venture.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Venture>> {
        Ok(self.ventures.lock().unwrap().iter().find(|v| v.id == id).cloned())
    }

    async fn update(&self, venture: &Venture) -> Result<()> {
        replace_by_id(&mut self.ventures.lock().unwrap(), venture, |v| &v.id, "Venture")
    }

    async fn list(&self, filter: &VentureFilter) -> Result<Vec<Venture>> {
        let mut rows: Vec<Venture> = self
            .ventures
            .lock()
            .unwrap()
            .iter()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_latest_for_entrepreneur(&self, entrepreneur_id: &str) -> Result<Option<Venture>> {
        Ok(self
            .ventures
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.entrepreneur_id == entrepreneur_id)
            .max_by_key(|v| v.created_at)
            .cloned())
    }

    async fn count_by_status(&self) -> Result<Vec<(VentureStatus, i64)>> {
        let ventures = self.ventures.lock().unwrap();
        Ok(VentureStatus::ALL
            .iter()
            .map(|s| (*s, ventures.iter().filter(|v| v.status == *s).count() as i64))
            .filter(|(_, n)| *n > 0)
            .collect())
    }
}

#[async_trait]
impl StreamRepository for TestBackend {
    async fn insert_many(&self, streams: &[VentureStream]) -> Result<()> {
        self.streams.lock().unwrap().extend_from_slice(streams);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<VentureStream>> {
        Ok(self.streams.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn list_for_venture(&self, venture_id: &str) -> Result<Vec<VentureStream>> {
        let mut rows: Vec<VentureStream> = self
            .streams
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.venture_id == venture_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.stream_number);
        Ok(rows)
    }

    async fn update(&self, stream: &VentureStream) -> Result<()> {
        replace_by_id(&mut self.streams.lock().unwrap(), stream, |s| &s.id, "Stream")
    }

    async fn insert_deliverables(&self, deliverables: &[StreamDeliverable]) -> Result<()> {
        self.deliverables.lock().unwrap().extend_from_slice(deliverables);
        Ok(())
    }

    async fn list_deliverables(&self, stream_id: &str) -> Result<Vec<StreamDeliverable>> {
        let mut rows: Vec<StreamDeliverable> = self
            .deliverables
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.stream_id == stream_id)
            .cloned()
            .collect();
        rows.sort_by_key(|d| d.sequence_number);
        Ok(rows)
    }

    async fn find_deliverable(&self, id: &str) -> Result<Option<StreamDeliverable>> {
        Ok(self.deliverables.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn update_deliverable(&self, deliverable: &StreamDeliverable) -> Result<()> {
        replace_by_id(&mut self.deliverables.lock().unwrap(), deliverable, |d| &d.id, "Deliverable")
    }
}

#[async_trait]
impl ReviewRepository for TestBackend {
    async fn insert(&self, review: &ApplicationReview) -> Result<()> {
        self.reviews.lock().unwrap().push(review.clone());
        Ok(())
    }

    async fn find_latest_for_venture(&self, venture_id: &str) -> Result<Option<ApplicationReview>> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.venture_id == venture_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }
}

#[async_trait]
impl ApprovalChainRepository for TestBackend {
    async fn insert_many(&self, items: &[ApprovalChainItem]) -> Result<()> {
        self.chain.lock().unwrap().extend_from_slice(items);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ApprovalChainItem>> {
        Ok(self.chain.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn list_for_venture(&self, venture_id: &str) -> Result<Vec<ApprovalChainItem>> {
        let mut rows: Vec<ApprovalChainItem> = self
            .chain
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.venture_id == venture_id)
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.sequence_number);
        Ok(rows)
    }

    async fn update(&self, item: &ApprovalChainItem) -> Result<()> {
        replace_by_id(&mut self.chain.lock().unwrap(), item, |i| &i.id, "Approval item")
    }

    async fn list_pending_for_approver(&self, approver_id: &str) -> Result<Vec<ApprovalChainItem>> {
        Ok(self
            .chain
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.approver_id == approver_id && i.status == crate::domain::ApprovalStatus::Pending)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AgreementRepository for TestBackend {
    async fn insert(&self, agreement: &Agreement) -> Result<()> {
        if self.fail_agreement_insert.load(Ordering::SeqCst) {
            return Err(AppError::Database("agreement insert failed".to_string()));
        }
        self.agreements.lock().unwrap().push(agreement.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Agreement>> {
        Ok(self.agreements.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn find_latest_for_venture(&self, venture_id: &str) -> Result<Option<Agreement>> {
        Ok(self
            .agreements
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.venture_id == venture_id)
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    async fn update(&self, agreement: &Agreement) -> Result<()> {
        replace_by_id(&mut self.agreements.lock().unwrap(), agreement, |a| &a.id, "Agreement")
    }
}

#[async_trait]
impl EngagementRepository for TestBackend {
    async fn insert_session(&self, session: &Session) -> Result<()> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn list_sessions(&self, venture_id: &str) -> Result<Vec<Session>> {
        let mut rows: Vec<Session> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.venture_id == venture_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.session_date.cmp(&a.session_date));
        Ok(rows)
    }

    async fn insert_mentor_request(&self, request: &MentorRequest) -> Result<()> {
        self.mentor_requests.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn find_mentor_request(&self, id: &str) -> Result<Option<MentorRequest>> {
        Ok(self.mentor_requests.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn update_mentor_request(&self, request: &MentorRequest) -> Result<()> {
        replace_by_id(&mut self.mentor_requests.lock().unwrap(), request, |r| &r.id, "Mentor request")
    }

    async fn list_mentor_requests(&self, mentor_id: Option<&str>) -> Result<Vec<MentorRequest>> {
        Ok(self
            .mentor_requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| mentor_id.map_or(true, |m| r.mentor_id == m))
            .cloned()
            .collect())
    }

    async fn insert_log(&self, log: &EngagementLog) -> Result<()> {
        self.logs.lock().unwrap().push(log.clone());
        Ok(())
    }

    async fn list_logs(&self, venture_id: &str) -> Result<Vec<EngagementLog>> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.venture_id == venture_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuthBackend for TestBackend {
    async fn sign_up(&self, email: &str, password: &str, metadata: &SignUpMetadata) -> Result<AuthUser> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(email) {
            return Err(AppError::Conflict(format!("Email already registered: {}", email)));
        }
        let user = AuthUser {
            id: format!("user-{}", users.len() + 1),
            email: email.to_string(),
            metadata: Some(metadata.clone()),
        };
        users.insert(email.to_string(), (user.clone(), password.to_string()));
        Ok(user)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let user = match self.users.lock().unwrap().get(email) {
            Some((user, stored)) if stored == password => user.clone(),
            _ => return Err(AppError::Unauthorized("Invalid login credentials".to_string())),
        };
        let n = self.next_token.fetch_add(1, Ordering::SeqCst);
        let session = AuthSession {
            token: format!("tok-{}", n),
            user,
            expires_at: i64::MAX,
        };
        self.auth_sessions
            .lock()
            .unwrap()
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        self.auth_sessions.lock().unwrap().remove(token);
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<AuthSession>> {
        Ok(self.auth_sessions.lock().unwrap().get(token).cloned())
    }
}
