//! RPC Request/Response Types
//!
//! Method parameters and results. Use-case payloads from the core crate are
//! reused as-is; authenticated methods wrap them in [`Authed`].

use accelerate_core::application::agreement::AgreementResponse;
use accelerate_core::application::navigation::NavigationView;
use accelerate_core::application::wizard::SupportNeeds;
use accelerate_core::application::SessionContext;
use accelerate_core::domain::{DeliverableStatus, MentorRequestStatus, VentureStatus};
use accelerate_core::port::MaintenanceStats;
use serde::{Deserialize, Serialize};

/// Parameters of an authenticated method: the session token plus the
/// method's own fields at the same level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authed<T> {
    pub session_token: String,
    #[serde(flatten)]
    pub params: T,
}

impl<T> Authed<T> {
    pub fn new(session_token: impl Into<String>, params: T) -> Self {
        Self {
            session_token: session_token.into(),
            params,
        }
    }
}

/// Methods whose only parameter is the session token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoParams {}

/// auth.signin.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub session: SessionContext,
    pub navigation: NavigationView,
}

/// auth.signout.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignOutResponse {
    pub signed_out: bool,
}

/// application.save_step.v1
///
/// `step` is a step name (`venture_definition`) or its number (`"1"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveStepRequest {
    pub step: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveStepResponse {
    pub step: String,
    pub saved: bool,
}

/// application.submit.v1
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub support_needs: Option<SupportNeeds>,
}

/// venture.list.v1
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VentureListRequest {
    #[serde(default)]
    pub statuses: Vec<VentureStatus>,
}

/// Any method addressing one venture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentureRef {
    pub venture_id: String,
}

/// agreement.respond.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementRespondRequest {
    pub agreement_id: String,
    pub response: AgreementResponse,
}

/// stream.update.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamUpdateRequest {
    pub stream_id: String,
    #[serde(flatten)]
    pub update: accelerate_core::application::streams::StreamUpdate,
}

/// deliverable.update.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableUpdateRequest {
    pub deliverable_id: String,
    pub status: DeliverableStatus,
}

/// mentor.respond.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorRespondRequest {
    pub request_id: String,
    pub status: MentorRequestStatus,
}

/// nav.routes.v1 - works signed out as well
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavRequest {
    #[serde(default)]
    pub session_token: Option<String>,
}

/// admin.maintenance.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceResponse {
    pub stats: MaintenanceStats,
    pub uptime_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use accelerate_core::application::triage::TriageRequest;
    use accelerate_core::domain::{RagStatus, TriageOutcome};

    #[test]
    fn test_authed_params_sit_beside_the_token() {
        let req: Authed<TriageRequest> = serde_json::from_value(serde_json::json!({
            "session_token": "tok-1",
            "venture_id": "v-1",
            "outcome": "core"
        }))
        .unwrap();

        assert_eq!(req.session_token, "tok-1");
        assert_eq!(req.params.venture_id, "v-1");
        assert_eq!(req.params.outcome, TriageOutcome::Core);
        assert!(req.params.notes.is_none());
    }

    #[test]
    fn test_stream_update_is_a_patch() {
        let req: Authed<StreamUpdateRequest> = serde_json::from_value(serde_json::json!({
            "session_token": "tok-1",
            "stream_id": "s-1",
            "rag_status": "red"
        }))
        .unwrap();

        assert_eq!(req.params.update.rag_status, Some(RagStatus::Red));
        assert!(req.params.update.owner_name.is_none());
    }

    #[test]
    fn test_token_only_methods_accept_bare_token() {
        let req: Authed<NoParams> =
            serde_json::from_value(serde_json::json!({ "session_token": "tok-1" })).unwrap();
        assert_eq!(req.session_token, "tok-1");
    }
}
