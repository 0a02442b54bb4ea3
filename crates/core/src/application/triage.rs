// Triage: the first staff decision on a submitted application

use super::{Ports, SessionContext};
use crate::domain::{
    chain_roles_for_tier, ApplicationReview, ApprovalChainItem, ApprovalStatus, Profile, Role,
    TriageOutcome, Venture, VentureTier,
};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRequest {
    pub venture_id: String,
    pub outcome: TriageOutcome,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    pub venture: Venture,
    pub review: ApplicationReview,
    pub chain: Vec<ApprovalChainItem>,
}

/// Pick the approver for every chain role. The leading success-manager
/// slot goes to the triaging staff member.
async fn resolve_approvers(
    ports: &Ports,
    ctx: &SessionContext,
    tier: VentureTier,
) -> Result<Vec<(Role, Profile)>> {
    let mut approvers = Vec::new();
    for (index, role) in chain_roles_for_tier(tier).iter().enumerate() {
        let profile = if index == 0 {
            ctx.profile.clone()
        } else {
            ports
                .profiles
                .find_first_by_role(*role)
                .await?
                .ok_or_else(|| {
                    AppError::Conflict(format!("No {} profile available to approve", role))
                })?
        };
        approvers.push((*role, profile));
    }
    Ok(approvers)
}

/// Record a triage review and move the venture to self_serve, or to
/// under_review with a fresh approval chain.
#[instrument(skip(ports, ctx, req), fields(venture_id = %req.venture_id, outcome = %req.outcome))]
pub async fn triage(ports: &Ports, ctx: &SessionContext, req: TriageRequest) -> Result<TriageResult> {
    if !ctx.role().can_triage() {
        return Err(AppError::Forbidden(format!("{} cannot triage applications", ctx.role())));
    }

    let mut venture = ports.load_venture(&req.venture_id).await?;
    let now = ports.clock.now_millis();
    venture.transition(req.outcome.resulting_status(), now)?;

    // Resolve every approver before writing anything
    let approvers = match req.outcome.tier() {
        Some(tier) => resolve_approvers(ports, ctx, tier).await?,
        None => Vec::new(),
    };

    let streams = ports.streams.list_for_venture(&venture.id).await?;
    let assessment = ports.content.assess_application(&venture, &streams).await?;

    let review = ApplicationReview::triaged(
        ports.ids.generate_id(),
        now,
        &venture.id,
        ctx.profile_id(),
        ctx.role(),
        req.outcome,
        req.notes,
        assessment,
    );
    ports.reviews.insert(&review).await?;

    venture.tier = req.outcome.tier();
    ports.ventures.update(&venture).await?;

    let mut chain = Vec::with_capacity(approvers.len());
    for (index, (role, profile)) in approvers.into_iter().enumerate() {
        let mut item = ApprovalChainItem::new(
            ports.ids.generate_id(),
            now,
            &venture.id,
            profile.id,
            role,
            index as i32 + 1,
        );
        if index == 0 {
            item.decide(ApprovalStatus::Approved, Some("Approved at triage".to_string()), now)?;
        }
        chain.push(item);
    }
    if !chain.is_empty() {
        ports.approvals.insert_many(&chain).await?;
    }

    info!(
        venture_id = %venture.id,
        status = %venture.status,
        chain_length = chain.len(),
        "Application triaged"
    );

    Ok(TriageResult {
        venture,
        review,
        chain,
    })
}

/// Latest review of a venture; staff only
pub async fn latest_review(
    ports: &Ports,
    ctx: &SessionContext,
    venture_id: &str,
) -> Result<Option<ApplicationReview>> {
    if !ctx.role().is_staff() {
        return Err(AppError::Forbidden("Reviews are visible to staff only".to_string()));
    }
    ports.load_venture(venture_id).await?;
    ports.reviews.find_latest_for_venture(venture_id).await
}
