// Agreement Domain Model

use super::error::{DomainError, Result};
use super::stream::{SupportType, VentureStream};
use super::{EntityId, Millis};
use serde::{Deserialize, Serialize};

/// Terms attached to every generated agreement
pub const STANDARD_TERMS: &str = "Standard Accelerate program terms apply. If support hours are \
exceeded, the beneficiary will fund additional engagement at prevailing rates.";

wire_enum! {
    pub enum AgreementStatus: "agreement status" {
        Pending => "pending",
        Accepted => "accepted",
        Declined => "declined",
    }
}

/// Support hours budgeted for one need_help stream
pub fn support_hours_for(support_type: Option<SupportType>) -> i64 {
    match support_type {
        Some(SupportType::Do) => 30,
        Some(SupportType::Connect) => 20,
        Some(SupportType::Learn) => 15,
        Some(SupportType::Other) | None => 0,
    }
}

/// Sum of support hours over the streams flagged need_help
pub fn total_support_hours(streams: &[VentureStream]) -> i64 {
    streams
        .iter()
        .filter(|s| s.needs_help())
        .map(|s| support_hours_for(s.support_type))
        .sum()
}

/// Support agreement generated once the approval chain clears
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: EntityId,
    pub venture_id: EntityId,
    pub total_support_hours: i64,
    /// Snapshot of the stream plan at generation time
    pub plan_details: serde_json::Value,
    pub terms: Option<String>,
    pub status: AgreementStatus,
    pub accepted_at: Option<Millis>,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl Agreement {
    /// Build a pending agreement from the venture's streams
    pub fn generate(
        id: impl Into<String>,
        created_at: Millis,
        venture_id: impl Into<String>,
        streams: &[VentureStream],
    ) -> Self {
        Self {
            id: id.into(),
            venture_id: venture_id.into(),
            total_support_hours: total_support_hours(streams),
            plan_details: serde_json::json!({ "streams": streams }),
            terms: Some(STANDARD_TERMS.to_string()),
            status: AgreementStatus::Pending,
            accepted_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Pending or accepted agreements count against the one-per-venture limit
    pub fn is_live(&self) -> bool {
        self.status != AgreementStatus::Declined
    }

    pub fn accept(&mut self, now_millis: Millis) -> Result<()> {
        self.respond(AgreementStatus::Accepted, now_millis)?;
        self.accepted_at = Some(now_millis);
        Ok(())
    }

    pub fn decline(&mut self, now_millis: Millis) -> Result<()> {
        self.respond(AgreementStatus::Declined, now_millis)
    }

    fn respond(&mut self, next: AgreementStatus, now_millis: Millis) -> Result<()> {
        if self.status != AgreementStatus::Pending {
            return Err(DomainError::transition("agreement", self.status, next));
        }
        self.status = next;
        self.updated_at = now_millis;
        Ok(())
    }
}
