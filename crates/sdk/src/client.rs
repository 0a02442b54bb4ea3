//! Accelerate Client Implementation

use crate::error::{Result, SdkError};
use crate::params;
use accelerate_api_rpc::types::{MaintenanceResponse, SignInResponse};
use accelerate_core::application::agreement::{AgreementOutcome, AgreementResponse};
use accelerate_core::application::approval::{DecisionOutcome, DecisionRequest, PendingApproval};
use accelerate_core::application::auth::SignUpRequest;
use accelerate_core::application::dashboard::Dashboard;
use accelerate_core::application::engagement::{
    HoursSummary, LogEngagementRequest, MentorRequestInput, RecordSessionRequest,
};
use accelerate_core::application::navigation::NavigationView;
use accelerate_core::application::streams::{StreamUpdate, StreamUpdateOutcome, StreamWithDeliverables};
use accelerate_core::application::triage::{TriageRequest, TriageResult};
use accelerate_core::application::wizard::{ApplicationDraft, SupportNeeds};
use accelerate_core::application::{CacheKey, CacheTopic, Mutation, QueryCache, SessionContext};
use accelerate_core::domain::{
    Agreement, ApplicationReview, ApprovalChainItem, DeliverableStatus, EngagementLog,
    MentorRequest, MentorRequestStatus, Profile, Session, StreamDeliverable, Venture, VentureStatus,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::RwLock;

/// Accelerate daemon client
///
/// Holds at most one signed-in session. Signing in or out drops the read
/// cache, so one user's reads never serve another's.
///
/// # Example
///
/// ```no_run
/// use accelerate_sdk::AccelerateClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AccelerateClient::connect("http://127.0.0.1:9630").await?;
/// client.sign_in("csm@example.com", "correct horse").await?;
/// for pending in client.pending_approvals().await? {
///     println!("{} waits on item {}", pending.venture.id, pending.item.id);
/// }
/// # Ok(())
/// # }
/// ```
pub struct AccelerateClient {
    client: HttpClient,
    token: RwLock<Option<String>>,
    cache: QueryCache,
}

impl AccelerateClient {
    /// Connect to the daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9630`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            token: RwLock::new(None),
            cache: QueryCache::new(),
        })
    }

    /// Resume a session whose token was kept elsewhere
    pub async fn resume(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
        self.cache.clear().await;
    }

    pub async fn session_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, params: ObjectParams) -> Result<R> {
        Ok(self.client.request(method, params).await?)
    }

    async fn authed<T: Serialize, R: DeserializeOwned>(&self, method: &str, request: &T) -> Result<R> {
        let token = self.session_token().await.ok_or(SdkError::NotSignedIn)?;
        self.call(method, params::authed(&token, request)?).await
    }

    /// Read through the cache: a hit skips the daemon entirely
    async fn cached<T: Serialize, R: Serialize + DeserializeOwned>(
        &self,
        key: CacheKey,
        method: &str,
        request: &T,
    ) -> Result<R> {
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(serde_json::from_value(hit)?);
        }
        let fresh: R = self.authed(method, request).await?;
        self.cache.put(key, serde_json::to_value(&fresh)?).await;
        Ok(fresh)
    }

    // ========== Auth ==========

    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Profile> {
        self.call("auth.signup.v1", params::object(&request)?).await
    }

    /// Sign in and keep the session for later calls
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse> {
        let response: SignInResponse = self
            .call(
                "auth.signin.v1",
                params::object(&json!({ "email": email, "password": password }))?,
            )
            .await?;
        self.resume(response.session.token.clone()).await;
        Ok(response)
    }

    /// Sign out; the local session is dropped even if the daemon call fails
    pub async fn sign_out(&self) -> Result<()> {
        let outcome: Result<serde_json::Value> = self.authed("auth.signout.v1", &()).await;
        *self.token.write().await = None;
        self.cache.clear().await;
        outcome.map(|_| ())
    }

    pub async fn current_session(&self) -> Result<SessionContext> {
        self.authed("auth.session.v1", &()).await
    }

    // ========== Application wizard ==========

    pub async fn save_step(&self, step: &str, data: serde_json::Value) -> Result<()> {
        let _: serde_json::Value = self
            .authed("application.save_step.v1", &json!({ "step": step, "data": data }))
            .await?;
        Ok(())
    }

    pub async fn draft(&self) -> Result<ApplicationDraft> {
        self.authed("application.draft.v1", &()).await
    }

    pub async fn submit(&self, support_needs: Option<SupportNeeds>) -> Result<Venture> {
        let venture = self
            .authed("application.submit.v1", &json!({ "support_needs": support_needs }))
            .await?;
        self.cache.apply(&Mutation::SubmitApplication).await;
        Ok(venture)
    }

    // ========== Ventures ==========

    pub async fn ventures(&self, statuses: &[VentureStatus]) -> Result<Vec<Venture>> {
        let scope: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        self.cached(
            CacheKey::scoped(CacheTopic::Ventures, scope.join(",")),
            "venture.list.v1",
            &json!({ "statuses": statuses }),
        )
        .await
    }

    pub async fn venture(&self, venture_id: &str) -> Result<Venture> {
        self.cached(
            CacheKey::scoped(CacheTopic::Venture, venture_id),
            "venture.get.v1",
            &json!({ "venture_id": venture_id }),
        )
        .await
    }

    pub async fn my_venture(&self) -> Result<Option<Venture>> {
        self.cached(CacheKey::topic(CacheTopic::MyVenture), "venture.mine.v1", &())
            .await
    }

    pub async fn complete_venture(&self, venture_id: &str) -> Result<Venture> {
        let venture = self
            .authed("venture.complete.v1", &json!({ "venture_id": venture_id }))
            .await?;
        self.cache
            .apply(&Mutation::CompleteVenture {
                venture_id: venture_id.to_string(),
            })
            .await;
        Ok(venture)
    }

    // ========== Review and approval ==========

    pub async fn triage(&self, request: TriageRequest) -> Result<TriageResult> {
        let venture_id = request.venture_id.clone();
        let result = self.authed("review.triage.v1", &request).await?;
        self.cache.apply(&Mutation::Triage { venture_id }).await;
        Ok(result)
    }

    pub async fn review(&self, venture_id: &str) -> Result<Option<ApplicationReview>> {
        self.cached(
            CacheKey::scoped(CacheTopic::Review, venture_id),
            "review.get.v1",
            &json!({ "venture_id": venture_id }),
        )
        .await
    }

    pub async fn approval_chain(&self, venture_id: &str) -> Result<Vec<ApprovalChainItem>> {
        self.cached(
            CacheKey::scoped(CacheTopic::ApprovalChain, venture_id),
            "approval.chain.v1",
            &json!({ "venture_id": venture_id }),
        )
        .await
    }

    pub async fn decide(&self, request: DecisionRequest) -> Result<DecisionOutcome> {
        let outcome: DecisionOutcome = self.authed("approval.decide.v1", &request).await?;
        self.cache
            .apply(&Mutation::DecideApproval {
                venture_id: outcome.item.venture_id.clone(),
            })
            .await;
        Ok(outcome)
    }

    /// Never cached: the queue changes with every other approver's decision
    pub async fn pending_approvals(&self) -> Result<Vec<PendingApproval>> {
        self.authed("approval.pending.v1", &()).await
    }

    // ========== Agreement ==========

    pub async fn agreement(&self, venture_id: &str) -> Result<Option<Agreement>> {
        self.cached(
            CacheKey::scoped(CacheTopic::Agreement, venture_id),
            "agreement.get.v1",
            &json!({ "venture_id": venture_id }),
        )
        .await
    }

    pub async fn respond_agreement(
        &self,
        agreement_id: &str,
        response: AgreementResponse,
    ) -> Result<AgreementOutcome> {
        let outcome: AgreementOutcome = self
            .authed(
                "agreement.respond.v1",
                &json!({ "agreement_id": agreement_id, "response": response }),
            )
            .await?;
        self.cache
            .apply(&Mutation::RespondAgreement {
                agreement_id: outcome.agreement.id.clone(),
                venture_id: outcome.agreement.venture_id.clone(),
            })
            .await;
        Ok(outcome)
    }

    // ========== Streams ==========

    pub async fn streams(&self, venture_id: &str) -> Result<Vec<StreamWithDeliverables>> {
        self.cached(
            CacheKey::scoped(CacheTopic::VentureStreams, venture_id),
            "stream.list.v1",
            &json!({ "venture_id": venture_id }),
        )
        .await
    }

    pub async fn update_stream(&self, stream_id: &str, update: StreamUpdate) -> Result<StreamUpdateOutcome> {
        let mut request = serde_json::to_value(&update)?;
        request["stream_id"] = json!(stream_id);

        let outcome: StreamUpdateOutcome = self.authed("stream.update.v1", &request).await?;
        self.cache
            .apply(&Mutation::UpdateStream {
                venture_id: outcome.stream.venture_id.clone(),
            })
            .await;
        Ok(outcome)
    }

    /// Returns the stream's deliverables after the change
    pub async fn update_deliverable(
        &self,
        deliverable_id: &str,
        status: DeliverableStatus,
    ) -> Result<Vec<StreamDeliverable>> {
        let deliverables = self
            .authed(
                "deliverable.update.v1",
                &json!({ "deliverable_id": deliverable_id, "status": status }),
            )
            .await?;
        self.cache.apply(&Mutation::UpdateDeliverable).await;
        Ok(deliverables)
    }

    // ========== Engagement ==========

    pub async fn record_session(&self, request: RecordSessionRequest) -> Result<Session> {
        let venture_id = request.venture_id.clone();
        let session = self.authed("session.record.v1", &request).await?;
        self.cache.apply(&Mutation::RecordSession { venture_id }).await;
        Ok(session)
    }

    pub async fn sessions(&self, venture_id: &str) -> Result<Vec<Session>> {
        self.cached(
            CacheKey::scoped(CacheTopic::Sessions, venture_id),
            "session.list.v1",
            &json!({ "venture_id": venture_id }),
        )
        .await
    }

    pub async fn request_mentor(&self, input: MentorRequestInput) -> Result<MentorRequest> {
        let request = self.authed("mentor.request.v1", &input).await?;
        self.cache
            .invalidate(&CacheKey::topic(CacheTopic::MentorRequests))
            .await;
        Ok(request)
    }

    pub async fn mentor_requests(&self) -> Result<Vec<MentorRequest>> {
        self.cached(CacheKey::topic(CacheTopic::MentorRequests), "mentor.list.v1", &())
            .await
    }

    pub async fn respond_mentor_request(
        &self,
        request_id: &str,
        status: MentorRequestStatus,
    ) -> Result<MentorRequest> {
        let request = self
            .authed(
                "mentor.respond.v1",
                &json!({ "request_id": request_id, "status": status }),
            )
            .await?;
        self.cache.apply(&Mutation::RespondMentorRequest).await;
        Ok(request)
    }

    pub async fn log_engagement(&self, request: LogEngagementRequest) -> Result<EngagementLog> {
        let venture_id = request.venture_id.clone();
        let log = self.authed("engagement.log.v1", &request).await?;
        self.cache.apply(&Mutation::LogEngagement { venture_id }).await;
        Ok(log)
    }

    pub async fn engagement_logs(&self, venture_id: &str) -> Result<Vec<EngagementLog>> {
        self.cached(
            CacheKey::scoped(CacheTopic::Engagement, venture_id),
            "engagement.list.v1",
            &json!({ "venture_id": venture_id }),
        )
        .await
    }

    pub async fn hours(&self, venture_id: &str) -> Result<HoursSummary> {
        self.authed("engagement.hours.v1", &json!({ "venture_id": venture_id }))
            .await
    }

    // ========== Dashboards and navigation ==========

    pub async fn dashboard(&self) -> Result<Dashboard> {
        self.cached(CacheKey::topic(CacheTopic::Dashboard), "dashboard.get.v1", &())
            .await
    }

    /// Routes for the current role; signed-out clients get the public view
    pub async fn navigation(&self) -> Result<NavigationView> {
        let token = self.session_token().await;
        self.call(
            "nav.routes.v1",
            params::object(&json!({ "session_token": token }))?,
        )
        .await
    }

    // ========== Admin ==========

    pub async fn profiles(&self) -> Result<Vec<Profile>> {
        self.authed("admin.profiles.v1", &()).await
    }

    pub async fn maintenance(&self) -> Result<MaintenanceResponse> {
        self.authed("admin.maintenance.v1", &()).await
    }

    #[cfg(test)]
    pub(crate) async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }
}
