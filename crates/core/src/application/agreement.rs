// Agreement accept/decline by the venture owner

use super::{Ports, SessionContext};
use crate::domain::{Agreement, StreamDeliverable, VentureStatus, DELIVERABLES_PER_STREAM};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementResponse {
    Accept,
    Decline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementOutcome {
    pub agreement: Agreement,
    pub venture_status: VentureStatus,
    pub deliverables_created: usize,
}

/// Latest agreement of a venture the caller may see
pub async fn get(ports: &Ports, ctx: &SessionContext, venture_id: &str) -> Result<Option<Agreement>> {
    ports.visible_venture(ctx, venture_id).await?;
    ports.agreements.find_latest_for_venture(venture_id).await
}

#[instrument(skip(ports, ctx), fields(profile_id = %ctx.profile_id()))]
pub async fn respond(
    ports: &Ports,
    ctx: &SessionContext,
    agreement_id: &str,
    response: AgreementResponse,
) -> Result<AgreementOutcome> {
    let mut agreement = ports
        .agreements
        .find_by_id(agreement_id)
        .await?
        .ok_or_else(|| AppError::not_found("Agreement", agreement_id))?;

    let mut venture = ports.load_venture(&agreement.venture_id).await?;
    if !venture.is_owned_by(ctx.profile_id()) {
        return Err(AppError::Forbidden(
            "Only the venture's entrepreneur can respond to its agreement".to_string(),
        ));
    }

    let now = ports.clock.now_millis();
    let next_status = match response {
        AgreementResponse::Accept => VentureStatus::Active,
        AgreementResponse::Decline => VentureStatus::Dropped,
    };
    // Both checks run before the first write
    if !venture.status.can_transition_to(next_status) {
        return Err(AppError::InvalidState(format!(
            "Venture {} is {}, cannot move to {}",
            venture.id, venture.status, next_status
        )));
    }

    match response {
        AgreementResponse::Accept => agreement.accept(now)?,
        AgreementResponse::Decline => agreement.decline(now)?,
    }
    ports.agreements.update(&agreement).await?;

    venture.transition(next_status, now)?;
    ports.ventures.update(&venture).await?;

    let deliverables_created = match response {
        AgreementResponse::Accept => seed_deliverables(ports, &venture.id, now).await?,
        AgreementResponse::Decline => 0,
    };

    info!(
        venture_id = %venture.id,
        agreement_id = %agreement.id,
        status = %agreement.status,
        deliverables_created,
        "Agreement responded"
    );

    Ok(AgreementOutcome {
        agreement,
        venture_status: venture.status,
        deliverables_created,
    })
}

/// Five checkpoints per stream, the first one current
async fn seed_deliverables(ports: &Ports, venture_id: &str, now: i64) -> Result<usize> {
    let streams = ports.streams.list_for_venture(venture_id).await?;
    let mut deliverables = Vec::new();

    for stream in &streams {
        let titles = ports
            .content
            .stream_checkpoints(stream, DELIVERABLES_PER_STREAM as usize)
            .await?;
        for seq in 1..=DELIVERABLES_PER_STREAM {
            let title = titles
                .get(seq as usize - 1)
                .cloned()
                .unwrap_or_else(|| format!("{} - Checkpoint {}", stream.stream_name, seq));
            deliverables.push(StreamDeliverable::new(
                ports.ids.generate_id(),
                now,
                &stream.id,
                seq,
                title,
            ));
        }
    }

    if !deliverables.is_empty() {
        ports.streams.insert_deliverables(&deliverables).await?;
    }
    Ok(deliverables.len())
}
