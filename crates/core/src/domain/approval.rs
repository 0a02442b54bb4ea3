// Approval Chain Domain Model

use super::error::{DomainError, Result};
use super::venture::VentureTier;
use super::{EntityId, Millis, Role};
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum ApprovalStatus: "approval status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

const PRIME_CHAIN: &[Role] = &[Role::SuccessManager, Role::FieldHead];
const CORE_CHAIN: &[Role] = &[Role::SuccessManager, Role::FieldHead, Role::SelectionManager];
const SELECT_CHAIN: &[Role] = &[
    Role::SuccessManager,
    Role::FieldHead,
    Role::SelectionManager,
    Role::SelectionCommittee,
];

/// Approver roles for a tier, in sequence order (sequence = index + 1).
///
/// The first entry is always the triaging success manager, whose item is
/// created already approved.
pub fn chain_roles_for_tier(tier: VentureTier) -> &'static [Role] {
    match tier {
        VentureTier::Prime => PRIME_CHAIN,
        VentureTier::Core => CORE_CHAIN,
        VentureTier::Select => SELECT_CHAIN,
    }
}

/// One required sign-off for a venture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalChainItem {
    pub id: EntityId,
    pub venture_id: EntityId,
    pub approver_id: EntityId,
    pub approver_role: Role,
    pub sequence_number: i32,
    pub status: ApprovalStatus,
    pub notes: Option<String>,
    pub decided_at: Option<Millis>,
    pub created_at: Millis,
}

impl ApprovalChainItem {
    pub fn new(
        id: impl Into<String>,
        created_at: Millis,
        venture_id: impl Into<String>,
        approver_id: impl Into<String>,
        approver_role: Role,
        sequence_number: i32,
    ) -> Self {
        Self {
            id: id.into(),
            venture_id: venture_id.into(),
            approver_id: approver_id.into(),
            approver_role,
            sequence_number,
            status: ApprovalStatus::Pending,
            notes: None,
            decided_at: None,
            created_at,
        }
    }

    /// Record a decision. Only pending items can be decided.
    pub fn decide(
        &mut self,
        decision: ApprovalStatus,
        notes: Option<String>,
        now_millis: Millis,
    ) -> Result<()> {
        if self.status != ApprovalStatus::Pending || decision == ApprovalStatus::Pending {
            return Err(DomainError::transition("approval", self.status, decision));
        }
        self.status = decision;
        self.notes = notes;
        self.decided_at = Some(now_millis);
        Ok(())
    }
}

/// Aggregate view of a full chain, recomputed from the items every time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainVerdict {
    /// At least one item is rejected
    Rejected,
    /// Every item is approved
    Approved,
    /// Still waiting on one or more approvers
    InProgress,
}

impl ChainVerdict {
    pub fn of(items: &[ApprovalChainItem]) -> Self {
        if items.iter().any(|i| i.status == ApprovalStatus::Rejected) {
            ChainVerdict::Rejected
        } else if !items.is_empty() && items.iter().all(|i| i.status == ApprovalStatus::Approved) {
            ChainVerdict::Approved
        } else {
            ChainVerdict::InProgress
        }
    }
}
