// Venture Domain Model

use super::error::{DomainError, Result};
use super::stream::RagStatus;
use super::{EntityId, Millis};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Venture lifecycle status
    pub enum VentureStatus: "venture status" {
        Draft => "draft",
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Rejected => "rejected",
        SelfServe => "self_serve",
        Active => "active",
        Completed => "completed",
        Dropped => "dropped",
    }
}

impl VentureStatus {
    /// Legal successor states.
    ///
    /// draft -> submitted -> under_review | self_serve
    /// under_review -> approved | rejected
    /// approved -> active | dropped
    /// active -> completed
    pub fn can_transition_to(&self, next: VentureStatus) -> bool {
        use VentureStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, UnderReview)
                | (Submitted, SelfServe)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (Approved, Active)
                | (Approved, Dropped)
                | (Active, Completed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VentureStatus::Rejected
                | VentureStatus::SelfServe
                | VentureStatus::Completed
                | VentureStatus::Dropped
        )
    }
}

wire_enum! {
    /// Program intensity assigned at triage
    pub enum VentureTier: "tier" {
        Prime => "prime",
        Core => "core",
        Select => "select",
    }
}

wire_enum! {
    /// How the applicant found the program
    pub enum ApplicationSource: "application source" {
        SelfInitiated => "self_initiated",
        PlatformNudge => "platform_nudge",
        CsmReferral => "csm_referral",
        EcosystemReferral => "ecosystem_referral",
    }
}

/// One entrepreneur's application and engagement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venture {
    pub id: EntityId,
    pub entrepreneur_id: EntityId,
    pub status: VentureStatus,
    pub tier: Option<VentureTier>,

    // Venture definition
    pub current_product: String,
    pub current_segment: String,
    pub current_geography: String,
    pub current_business_model: String,
    pub venture_product: Option<String>,
    pub venture_segment: Option<String>,
    pub venture_geography: Option<String>,
    pub venture_business_model: Option<String>,
    pub venture_description: Option<String>,
    pub expected_revenue_range: Option<String>,

    // Commitment
    pub progress_so_far: Option<String>,
    pub investment_willingness: Option<String>,
    pub resource_allocation: Option<String>,

    // Source
    pub source: Option<ApplicationSource>,
    pub referrer_id: Option<EntityId>,

    // Assignments
    pub venture_partner_id: Option<EntityId>,
    pub success_manager_id: Option<EntityId>,

    pub overall_rag: Option<RagStatus>,

    pub created_at: Millis,
    pub updated_at: Millis,
}

impl Venture {
    /// Create a draft venture owned by `entrepreneur_id`
    pub fn new(id: impl Into<String>, created_at: Millis, entrepreneur_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entrepreneur_id: entrepreneur_id.into(),
            status: VentureStatus::Draft,
            tier: None,
            current_product: String::new(),
            current_segment: String::new(),
            current_geography: String::new(),
            current_business_model: String::new(),
            venture_product: None,
            venture_segment: None,
            venture_geography: None,
            venture_business_model: None,
            venture_description: None,
            expected_revenue_range: None,
            progress_so_far: None,
            investment_willingness: None,
            resource_allocation: None,
            source: None,
            referrer_id: None,
            venture_partner_id: None,
            success_manager_id: None,
            overall_rag: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Move to `next`, rejecting transitions outside the lifecycle
    pub fn transition(&mut self, next: VentureStatus, now_millis: Millis) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::transition("venture", self.status, next));
        }
        self.status = next;
        self.updated_at = now_millis;
        Ok(())
    }

    pub fn submit(&mut self, now_millis: Millis) -> Result<()> {
        self.transition(VentureStatus::Submitted, now_millis)
    }

    /// Whether the target definition differs from the current business at all
    pub fn has_venture_change(&self) -> bool {
        [
            &self.venture_product,
            &self.venture_segment,
            &self.venture_geography,
            &self.venture_business_model,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    pub fn is_owned_by(&self, profile_id: &str) -> bool {
        self.entrepreneur_id == profile_id
    }
}
