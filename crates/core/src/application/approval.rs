// Approval chain decisions
//
// Each step below is its own repository call. A failure part-way leaves the
// earlier writes in place; nothing is compensated.

use super::{Ports, SessionContext};
use crate::domain::{
    Agreement, ApprovalChainItem, ApprovalStatus, ChainVerdict, Venture, VentureStatus,
};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub item_id: String,
    pub decision: ApprovalStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub item: ApprovalChainItem,
    pub venture_status: VentureStatus,
    pub agreement: Option<Agreement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingApproval {
    pub item: ApprovalChainItem,
    pub venture: Venture,
}

#[instrument(skip(ports, ctx, req), fields(item_id = %req.item_id, decision = %req.decision))]
pub async fn decide(ports: &Ports, ctx: &SessionContext, req: DecisionRequest) -> Result<DecisionOutcome> {
    let mut item = ports
        .approvals
        .find_by_id(&req.item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Approval item", &req.item_id))?;

    if item.approver_id != ctx.profile_id() {
        return Err(AppError::Forbidden(format!(
            "Approval item {} is assigned to another approver",
            item.id
        )));
    }

    let mut venture = ports.load_venture(&item.venture_id).await?;
    if venture.status != VentureStatus::UnderReview {
        return Err(AppError::InvalidState(format!(
            "Venture {} is {}, not under review",
            venture.id, venture.status
        )));
    }

    let now = ports.clock.now_millis();
    item.decide(req.decision, req.notes, now)?;
    ports.approvals.update(&item).await?;

    info!(
        venture_id = %venture.id,
        approver_role = %item.approver_role,
        sequence = item.sequence_number,
        decision = %item.status,
        "Approval decided"
    );

    if item.status == ApprovalStatus::Rejected {
        venture.transition(VentureStatus::Rejected, now)?;
        ports.ventures.update(&venture).await?;
        info!(venture_id = %venture.id, "Venture rejected by approval chain");
        return Ok(DecisionOutcome {
            item,
            venture_status: venture.status,
            agreement: None,
        });
    }

    let chain = ports.approvals.list_for_venture(&venture.id).await?;
    if ChainVerdict::of(&chain) != ChainVerdict::Approved {
        return Ok(DecisionOutcome {
            item,
            venture_status: venture.status,
            agreement: None,
        });
    }

    venture.transition(VentureStatus::Approved, now)?;
    ports.ventures.update(&venture).await?;
    info!(venture_id = %venture.id, tier = ?venture.tier, "Venture approved");

    let agreement = generate_agreement(ports, &venture, now).await?;

    if venture.success_manager_id.is_none() {
        venture.success_manager_id = Some(ctx.profile_id().to_string());
        ports.ventures.update(&venture).await?;
    }

    Ok(DecisionOutcome {
        item,
        venture_status: venture.status,
        agreement,
    })
}

/// Create the venture's agreement unless a live one already exists
async fn generate_agreement(ports: &Ports, venture: &Venture, now: i64) -> Result<Option<Agreement>> {
    if let Some(existing) = ports.agreements.find_latest_for_venture(&venture.id).await? {
        if existing.is_live() {
            warn!(venture_id = %venture.id, agreement_id = %existing.id, "Live agreement exists, not generating another");
            return Ok(None);
        }
    }

    let streams = ports.streams.list_for_venture(&venture.id).await?;
    let agreement = Agreement::generate(ports.ids.generate_id(), now, &venture.id, &streams);
    ports.agreements.insert(&agreement).await?;

    info!(
        venture_id = %venture.id,
        agreement_id = %agreement.id,
        total_support_hours = agreement.total_support_hours,
        "Agreement generated"
    );
    Ok(Some(agreement))
}

/// Chain items of a venture in sequence order
pub async fn chain(ports: &Ports, ctx: &SessionContext, venture_id: &str) -> Result<Vec<ApprovalChainItem>> {
    ports.visible_venture(ctx, venture_id).await?;
    ports.approvals.list_for_venture(venture_id).await
}

/// Items waiting on the caller, for ventures still under review
pub async fn pending_for(ports: &Ports, ctx: &SessionContext) -> Result<Vec<PendingApproval>> {
    let items = ports.approvals.list_pending_for_approver(ctx.profile_id()).await?;
    let mut pending = Vec::with_capacity(items.len());
    for item in items {
        if let Some(venture) = ports.ventures.find_by_id(&item.venture_id).await? {
            if venture.status == VentureStatus::UnderReview {
                pending.push(PendingApproval { item, venture });
            }
        }
    }
    Ok(pending)
}
