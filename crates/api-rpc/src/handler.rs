//! RPC Method Handlers
//!
//! Resolves the caller's session from the token, then delegates to the
//! matching use case in `accelerate_core::application`.

use crate::error::to_rpc_error;
use crate::types::{
    AgreementRespondRequest, Authed, DeliverableUpdateRequest, MaintenanceResponse,
    MentorRespondRequest, NavRequest, NoParams, SaveStepRequest, SaveStepResponse, SignInRequest,
    SignInResponse, SignOutResponse, StreamUpdateRequest, SubmitRequest, VentureListRequest,
    VentureRef,
};
use accelerate_core::application::agreement::AgreementOutcome;
use accelerate_core::application::approval::{DecisionOutcome, DecisionRequest, PendingApproval};
use accelerate_core::application::auth::SignUpRequest;
use accelerate_core::application::dashboard::Dashboard;
use accelerate_core::application::engagement::{
    HoursSummary, LogEngagementRequest, MentorRequestInput, RecordSessionRequest,
};
use accelerate_core::application::navigation::NavigationView;
use accelerate_core::application::streams::{StreamUpdateOutcome, StreamWithDeliverables};
use accelerate_core::application::triage::{TriageRequest, TriageResult};
use accelerate_core::application::wizard::{ApplicationDraft, WizardStep};
use accelerate_core::application::{
    agreement, approval, auth, dashboard, engagement, maintenance, navigation, streams, triage,
    ventures, wizard, MaintenanceScheduler, Ports, SessionContext,
};
use accelerate_core::domain::{
    Agreement, ApplicationReview, ApprovalChainItem, EngagementLog, MentorRequest, Profile,
    Session, StreamDeliverable, Venture,
};
use jsonrpsee::types::ErrorObjectOwned;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    ports: Ports,
    scheduler: MaintenanceScheduler,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(ports: Ports, scheduler: MaintenanceScheduler) -> Self {
        Self {
            ports,
            scheduler,
            start_time: std::time::Instant::now(),
        }
    }

    async fn session(&self, token: &str) -> RpcResult<SessionContext> {
        auth::resolve(&self.ports, token).await.map_err(to_rpc_error)
    }

    // ---- auth ----

    /// auth.signup.v1
    pub async fn sign_up(&self, req: SignUpRequest) -> RpcResult<Profile> {
        auth::sign_up(&self.ports, req).await.map_err(to_rpc_error)
    }

    /// auth.signin.v1
    pub async fn sign_in(&self, req: SignInRequest) -> RpcResult<SignInResponse> {
        let session = auth::sign_in(&self.ports, &req.email, &req.password)
            .await
            .map_err(to_rpc_error)?;
        let navigation = navigation::navigation_for(Some(session.role()));
        Ok(SignInResponse { session, navigation })
    }

    /// auth.signout.v1
    pub async fn sign_out(&self, req: Authed<NoParams>) -> RpcResult<SignOutResponse> {
        let ctx = self.session(&req.session_token).await?;
        auth::sign_out(&self.ports, &ctx).await.map_err(to_rpc_error)?;
        Ok(SignOutResponse { signed_out: true })
    }

    /// auth.session.v1
    pub async fn current_session(&self, req: Authed<NoParams>) -> RpcResult<SessionContext> {
        self.session(&req.session_token).await
    }

    // ---- application wizard ----

    /// application.save_step.v1
    pub async fn save_step(&self, req: Authed<SaveStepRequest>) -> RpcResult<SaveStepResponse> {
        let ctx = self.session(&req.session_token).await?;
        let step: WizardStep = req.params.step.parse().map_err(to_rpc_error)?;
        wizard::save_step(&self.ports, &ctx, step, req.params.data)
            .await
            .map_err(to_rpc_error)?;
        Ok(SaveStepResponse {
            step: step.as_str().to_string(),
            saved: true,
        })
    }

    /// application.draft.v1
    pub async fn draft(&self, req: Authed<NoParams>) -> RpcResult<ApplicationDraft> {
        let ctx = self.session(&req.session_token).await?;
        wizard::draft(&self.ports, &ctx).await.map_err(to_rpc_error)
    }

    /// application.submit.v1
    pub async fn submit(&self, req: Authed<SubmitRequest>) -> RpcResult<Venture> {
        let ctx = self.session(&req.session_token).await?;
        wizard::submit(&self.ports, &ctx, req.params.support_needs)
            .await
            .map_err(to_rpc_error)
    }

    // ---- ventures ----

    /// venture.list.v1
    pub async fn list_ventures(&self, req: Authed<VentureListRequest>) -> RpcResult<Vec<Venture>> {
        let ctx = self.session(&req.session_token).await?;
        ventures::list(&self.ports, &ctx, &req.params.statuses)
            .await
            .map_err(to_rpc_error)
    }

    /// venture.get.v1
    pub async fn get_venture(&self, req: Authed<VentureRef>) -> RpcResult<Venture> {
        let ctx = self.session(&req.session_token).await?;
        ventures::get(&self.ports, &ctx, &req.params.venture_id)
            .await
            .map_err(to_rpc_error)
    }

    /// venture.mine.v1
    pub async fn my_venture(&self, req: Authed<NoParams>) -> RpcResult<Option<Venture>> {
        let ctx = self.session(&req.session_token).await?;
        ventures::mine(&self.ports, &ctx).await.map_err(to_rpc_error)
    }

    /// venture.complete.v1
    pub async fn complete_venture(&self, req: Authed<VentureRef>) -> RpcResult<Venture> {
        let ctx = self.session(&req.session_token).await?;
        ventures::complete(&self.ports, &ctx, &req.params.venture_id)
            .await
            .map_err(to_rpc_error)
    }

    // ---- review & approvals ----

    /// review.triage.v1
    pub async fn triage(&self, req: Authed<TriageRequest>) -> RpcResult<TriageResult> {
        let ctx = self.session(&req.session_token).await?;
        triage::triage(&self.ports, &ctx, req.params)
            .await
            .map_err(to_rpc_error)
    }

    /// review.get.v1
    pub async fn review(&self, req: Authed<VentureRef>) -> RpcResult<Option<ApplicationReview>> {
        let ctx = self.session(&req.session_token).await?;
        triage::latest_review(&self.ports, &ctx, &req.params.venture_id)
            .await
            .map_err(to_rpc_error)
    }

    /// approval.chain.v1
    pub async fn chain(&self, req: Authed<VentureRef>) -> RpcResult<Vec<ApprovalChainItem>> {
        let ctx = self.session(&req.session_token).await?;
        approval::chain(&self.ports, &ctx, &req.params.venture_id)
            .await
            .map_err(to_rpc_error)
    }

    /// approval.decide.v1
    pub async fn decide(&self, req: Authed<DecisionRequest>) -> RpcResult<DecisionOutcome> {
        let ctx = self.session(&req.session_token).await?;
        approval::decide(&self.ports, &ctx, req.params)
            .await
            .map_err(to_rpc_error)
    }

    /// approval.pending.v1
    pub async fn pending_approvals(&self, req: Authed<NoParams>) -> RpcResult<Vec<PendingApproval>> {
        let ctx = self.session(&req.session_token).await?;
        approval::pending_for(&self.ports, &ctx)
            .await
            .map_err(to_rpc_error)
    }

    // ---- agreements ----

    /// agreement.get.v1
    pub async fn agreement(&self, req: Authed<VentureRef>) -> RpcResult<Option<Agreement>> {
        let ctx = self.session(&req.session_token).await?;
        agreement::get(&self.ports, &ctx, &req.params.venture_id)
            .await
            .map_err(to_rpc_error)
    }

    /// agreement.respond.v1
    pub async fn respond_agreement(
        &self,
        req: Authed<AgreementRespondRequest>,
    ) -> RpcResult<AgreementOutcome> {
        let ctx = self.session(&req.session_token).await?;
        agreement::respond(&self.ports, &ctx, &req.params.agreement_id, req.params.response)
            .await
            .map_err(to_rpc_error)
    }

    // ---- streams ----

    /// stream.list.v1
    pub async fn list_streams(&self, req: Authed<VentureRef>) -> RpcResult<Vec<StreamWithDeliverables>> {
        let ctx = self.session(&req.session_token).await?;
        streams::list(&self.ports, &ctx, &req.params.venture_id)
            .await
            .map_err(to_rpc_error)
    }

    /// stream.update.v1
    pub async fn update_stream(&self, req: Authed<StreamUpdateRequest>) -> RpcResult<StreamUpdateOutcome> {
        let ctx = self.session(&req.session_token).await?;
        streams::update_stream(&self.ports, &ctx, &req.params.stream_id, req.params.update)
            .await
            .map_err(to_rpc_error)
    }

    /// deliverable.update.v1
    pub async fn update_deliverable(
        &self,
        req: Authed<DeliverableUpdateRequest>,
    ) -> RpcResult<Vec<StreamDeliverable>> {
        let ctx = self.session(&req.session_token).await?;
        streams::update_deliverable(&self.ports, &ctx, &req.params.deliverable_id, req.params.status)
            .await
            .map_err(to_rpc_error)
    }

    // ---- engagement ----

    /// session.record.v1
    pub async fn record_session(&self, req: Authed<RecordSessionRequest>) -> RpcResult<Session> {
        let ctx = self.session(&req.session_token).await?;
        engagement::record_session(&self.ports, &ctx, req.params)
            .await
            .map_err(to_rpc_error)
    }

    /// session.list.v1
    pub async fn list_sessions(&self, req: Authed<VentureRef>) -> RpcResult<Vec<Session>> {
        let ctx = self.session(&req.session_token).await?;
        engagement::list_sessions(&self.ports, &ctx, &req.params.venture_id)
            .await
            .map_err(to_rpc_error)
    }

    /// mentor.request.v1
    pub async fn request_mentor(&self, req: Authed<MentorRequestInput>) -> RpcResult<MentorRequest> {
        let ctx = self.session(&req.session_token).await?;
        engagement::request_mentor(&self.ports, &ctx, req.params)
            .await
            .map_err(to_rpc_error)
    }

    /// mentor.list.v1
    pub async fn list_mentor_requests(&self, req: Authed<NoParams>) -> RpcResult<Vec<MentorRequest>> {
        let ctx = self.session(&req.session_token).await?;
        engagement::list_mentor_requests(&self.ports, &ctx)
            .await
            .map_err(to_rpc_error)
    }

    /// mentor.respond.v1
    pub async fn respond_mentor_request(
        &self,
        req: Authed<MentorRespondRequest>,
    ) -> RpcResult<MentorRequest> {
        let ctx = self.session(&req.session_token).await?;
        engagement::respond_mentor_request(&self.ports, &ctx, &req.params.request_id, req.params.status)
            .await
            .map_err(to_rpc_error)
    }

    /// engagement.log.v1
    pub async fn log_engagement(&self, req: Authed<LogEngagementRequest>) -> RpcResult<EngagementLog> {
        let ctx = self.session(&req.session_token).await?;
        engagement::log_engagement(&self.ports, &ctx, req.params)
            .await
            .map_err(to_rpc_error)
    }

    /// engagement.list.v1
    pub async fn list_engagement(&self, req: Authed<VentureRef>) -> RpcResult<Vec<EngagementLog>> {
        let ctx = self.session(&req.session_token).await?;
        engagement::list_logs(&self.ports, &ctx, &req.params.venture_id)
            .await
            .map_err(to_rpc_error)
    }

    /// engagement.hours.v1
    pub async fn hours(&self, req: Authed<VentureRef>) -> RpcResult<HoursSummary> {
        let ctx = self.session(&req.session_token).await?;
        engagement::hours_summary(&self.ports, &ctx, &req.params.venture_id)
            .await
            .map_err(to_rpc_error)
    }

    // ---- views ----

    /// dashboard.get.v1
    pub async fn dashboard(&self, req: Authed<NoParams>) -> RpcResult<Dashboard> {
        let ctx = self.session(&req.session_token).await?;
        dashboard::dashboard(&self.ports, &ctx)
            .await
            .map_err(to_rpc_error)
    }

    /// nav.routes.v1
    ///
    /// An unknown or expired token yields the signed-out navigation rather
    /// than an error.
    pub async fn nav_routes(&self, req: NavRequest) -> RpcResult<NavigationView> {
        let role = match req.session_token {
            Some(token) => auth::resolve(&self.ports, &token)
                .await
                .ok()
                .map(|ctx| ctx.role()),
            None => None,
        };
        Ok(navigation::navigation_for(role))
    }

    // ---- admin ----

    /// admin.profiles.v1
    pub async fn profiles(&self, req: Authed<NoParams>) -> RpcResult<Vec<Profile>> {
        let ctx = self.session(&req.session_token).await?;
        maintenance::list_profiles(&self.ports, &ctx)
            .await
            .map_err(to_rpc_error)
    }

    /// admin.maintenance.v1
    pub async fn maintenance(&self, req: Authed<NoParams>) -> RpcResult<MaintenanceResponse> {
        let ctx = self.session(&req.session_token).await?;
        let stats = maintenance::run_maintenance(&self.scheduler, &ctx)
            .await
            .map_err(to_rpc_error)?;

        Ok(MaintenanceResponse {
            stats,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }
}
