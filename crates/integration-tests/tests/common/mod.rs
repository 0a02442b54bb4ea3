//! Shared fixtures: a migrated in-memory database behind real SQLite ports

#![allow(dead_code)]

use std::sync::Arc;

use accelerate_core::application::auth::{self, SignUpRequest};
use accelerate_core::application::triage::{self, TriageRequest, TriageResult};
use accelerate_core::application::wizard::{self, StreamAssessment, SupportNeeds, WizardStep};
use accelerate_core::application::{Ports, SessionContext};
use accelerate_core::domain::{Role, StreamSelfStatus, SupportType, TriageOutcome, Venture};
use accelerate_core::port::time_provider::SteppingTimeProvider;
use accelerate_infra_sqlite::{build_ports_with_clock, create_pool, run_migrations};
use serde_json::json;
use sqlx::SqlitePool;

pub const PASSWORD: &str = "correct horse battery";
pub const T0: i64 = 1_700_000_000_000;
pub const SESSION_TTL_HOURS: i64 = 24;

pub struct Harness {
    pub pool: SqlitePool,
    pub ports: Ports,
    pub clock: Arc<SteppingTimeProvider>,
}

pub struct Staff {
    pub csm: SessionContext,
    pub field_head: SessionContext,
    pub selection_manager: SessionContext,
    pub selection_committee: SessionContext,
}

impl Harness {
    pub async fn new() -> Self {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        // One second per clock read keeps every timestamp distinct
        let clock = Arc::new(SteppingTimeProvider::new(T0, 1_000));
        let ports = build_ports_with_clock(pool.clone(), SESSION_TTL_HOURS, clock.clone());
        Self { pool, ports, clock }
    }

    /// Sign up and sign in
    pub async fn user(&self, email: &str, role: Role) -> SessionContext {
        auth::sign_up(
            &self.ports,
            SignUpRequest {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                full_name: email.split('@').next().unwrap_or(email).to_string(),
                role,
                organization: None,
                phone: None,
            },
        )
        .await
        .unwrap();
        auth::sign_in(&self.ports, email, PASSWORD).await.unwrap()
    }

    pub async fn staff(&self) -> Staff {
        Staff {
            csm: self.user("csm@example.com", Role::SuccessManager).await,
            field_head: self.user("fh@example.com", Role::FieldHead).await,
            selection_manager: self.user("sm@example.com", Role::SelectionManager).await,
            selection_committee: self.user("sc@example.com", Role::SelectionCommittee).await,
        }
    }

    /// Walk the wizard and submit
    pub async fn apply(&self, entrepreneur: &SessionContext, needs: SupportNeeds) -> Venture {
        wizard::save_step(
            &self.ports,
            entrepreneur,
            WizardStep::VentureDefinition,
            json!({
                "current_product": "Spice blends",
                "current_segment": "Local grocers",
                "current_geography": "Pune",
                "current_business_model": "Wholesale",
                "venture_segment": "Online direct to consumer",
                "expected_revenue_range": "1-5 Cr",
            }),
        )
        .await
        .unwrap();
        wizard::save_step(
            &self.ports,
            entrepreneur,
            WizardStep::Commitment,
            json!({ "investment_willingness": "yes", "resource_allocation": "two hires" }),
        )
        .await
        .unwrap();
        wizard::submit(&self.ports, entrepreneur, Some(needs)).await.unwrap()
    }

    pub async fn triage(
        &self,
        csm: &SessionContext,
        venture_id: &str,
        outcome: TriageOutcome,
    ) -> TriageResult {
        triage::triage(
            &self.ports,
            csm,
            TriageRequest {
                venture_id: venture_id.to_string(),
                outcome,
                notes: Some("Strong founder".to_string()),
            },
        )
        .await
        .unwrap()
    }

    pub async fn venture(&self, venture_id: &str) -> Venture {
        self.ports.ventures.find_by_id(venture_id).await.unwrap().unwrap()
    }
}

pub fn assessment(
    stream_number: i32,
    self_status: StreamSelfStatus,
    support_type: Option<SupportType>,
) -> StreamAssessment {
    StreamAssessment {
        stream_number,
        self_status,
        support_type,
        support_type_other: None,
        end_deliverable: None,
    }
}

/// All six streams, connect (20h) and learn (15h) help on two: 35 hours
pub fn core_needs() -> SupportNeeds {
    SupportNeeds {
        streams: vec![
            assessment(1, StreamSelfStatus::NeedHelp, Some(SupportType::Connect)),
            assessment(2, StreamSelfStatus::NeedHelp, Some(SupportType::Learn)),
            assessment(3, StreamSelfStatus::OnIt, None),
            assessment(4, StreamSelfStatus::Done, None),
            assessment(5, StreamSelfStatus::OnIt, None),
            assessment(6, StreamSelfStatus::Done, None),
        ],
        ..Default::default()
    }
}
