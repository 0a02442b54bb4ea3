// Application Review Domain Model

use super::venture::{VentureStatus, VentureTier};
use super::{EntityId, Millis, Role};
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum ReviewDecision: "review decision" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        NeedsInterview => "needs_interview",
    }
}

wire_enum! {
    /// Outcome of the first staff decision on a submitted application
    pub enum TriageOutcome: "triage outcome" {
        SelfServe => "self_serve",
        Prime => "prime",
        Core => "core",
        Select => "select",
    }
}

impl TriageOutcome {
    /// Tier assigned to the venture; self-serve carries none
    pub fn tier(&self) -> Option<VentureTier> {
        match self {
            TriageOutcome::SelfServe => None,
            TriageOutcome::Prime => Some(VentureTier::Prime),
            TriageOutcome::Core => Some(VentureTier::Core),
            TriageOutcome::Select => Some(VentureTier::Select),
        }
    }

    /// Venture status after triage
    pub fn resulting_status(&self) -> VentureStatus {
        match self {
            TriageOutcome::SelfServe => VentureStatus::SelfServe,
            _ => VentureStatus::UnderReview,
        }
    }
}

/// Estimated jobs effect of the venture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobsImpact {
    pub creative: i64,
    pub destructive: i64,
    pub net: i64,
    pub description: String,
}

/// Structured assessment blocks produced by the content generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationAssessment {
    pub tier_recommendation: Option<String>,
    pub failure_reasons: Vec<String>,
    pub opportunity_reasons: Vec<String>,
    pub probing_questions: Vec<String>,
    pub market_size: Option<String>,
    pub jobs_impact: Option<JobsImpact>,
}

/// Decision record for one venture's application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationReview {
    pub id: EntityId,
    pub venture_id: EntityId,
    pub reviewer_id: EntityId,
    pub reviewer_role: Role,
    pub assessment: ApplicationAssessment,
    pub decision: ReviewDecision,
    pub decision_notes: Option<String>,
    pub triage_outcome: Option<TriageOutcome>,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl ApplicationReview {
    /// A completed triage: the decision is recorded as approved with the outcome
    #[allow(clippy::too_many_arguments)]
    pub fn triaged(
        id: impl Into<String>,
        created_at: Millis,
        venture_id: impl Into<String>,
        reviewer_id: impl Into<String>,
        reviewer_role: Role,
        outcome: TriageOutcome,
        decision_notes: Option<String>,
        assessment: ApplicationAssessment,
    ) -> Self {
        Self {
            id: id.into(),
            venture_id: venture_id.into(),
            reviewer_id: reviewer_id.into(),
            reviewer_role,
            assessment,
            decision: ReviewDecision::Approved,
            decision_notes,
            triage_outcome: Some(outcome),
            created_at,
            updated_at: created_at,
        }
    }
}
