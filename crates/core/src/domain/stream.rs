// Stream & Deliverable Domain Model

use super::error::{DomainError, Result};
use super::{EntityId, Millis};
use serde::{Deserialize, Serialize};

/// Static definition of one of the six program streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamDefinition {
    pub number: i32,
    pub name: &'static str,
    pub description: &'static str,
}

pub const STREAM_DEFINITIONS: [StreamDefinition; 6] = [
    StreamDefinition {
        number: 1,
        name: "Capital & Funding",
        description: "Secured funding or investment needed for the venture",
    },
    StreamDefinition {
        number: 2,
        name: "Product / Service",
        description: "Customer-validated, paid-for product or service",
    },
    StreamDefinition {
        number: 3,
        name: "People & Talent",
        description: "Right team assembled and operational",
    },
    StreamDefinition {
        number: 4,
        name: "Operations & Supply Chain",
        description: "End-to-end operations running at required capacity",
    },
    StreamDefinition {
        number: 5,
        name: "Go-to-Market (GTM)",
        description: "Active sales pipeline with paying customers",
    },
    StreamDefinition {
        number: 6,
        name: "Procurement & Infrastructure",
        description: "All required infrastructure and procurement in place",
    },
];

impl StreamDefinition {
    pub fn by_number(number: i32) -> Option<&'static StreamDefinition> {
        STREAM_DEFINITIONS.iter().find(|d| d.number == number)
    }
}

/// Number of checkpoint deliverables seeded per stream on agreement acceptance
pub const DELIVERABLES_PER_STREAM: i32 = 5;

wire_enum! {
    /// Applicant's own assessment of a stream
    pub enum StreamSelfStatus: "stream self status" {
        Done => "done",
        OnIt => "on_it",
        NeedHelp => "need_help",
    }
}

wire_enum! {
    /// Kind of support requested on a need_help stream
    pub enum SupportType: "support type" {
        Learn => "learn",
        Connect => "connect",
        Do => "do",
        Other => "other",
    }
}

wire_enum! {
    /// Traffic-light progress indicator
    pub enum RagStatus: "rag status" {
        Red => "red",
        Yellow => "yellow",
        Green => "green",
        Complete => "complete",
    }
}

impl RagStatus {
    /// Higher is worse
    fn severity(&self) -> u8 {
        match self {
            RagStatus::Complete => 0,
            RagStatus::Green => 1,
            RagStatus::Yellow => 2,
            RagStatus::Red => 3,
        }
    }

    /// Aggregate stream indicators into a venture-level indicator.
    ///
    /// `complete` only when every stream is complete, otherwise the worst
    /// non-complete indicator. Streams without an indicator count as green.
    pub fn overall<I>(statuses: I) -> Option<RagStatus>
    where
        I: IntoIterator<Item = Option<RagStatus>>,
    {
        let statuses: Vec<RagStatus> = statuses
            .into_iter()
            .map(|s| s.unwrap_or(RagStatus::Green))
            .collect();

        if statuses.is_empty() {
            return None;
        }
        if statuses.iter().all(|s| *s == RagStatus::Complete) {
            return Some(RagStatus::Complete);
        }
        statuses
            .into_iter()
            .filter(|s| *s != RagStatus::Complete)
            .max_by_key(|s| s.severity())
    }
}

wire_enum! {
    pub enum DeliverableStatus: "deliverable status" {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

/// One of the six work streams of a venture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VentureStream {
    pub id: EntityId,
    pub venture_id: EntityId,
    pub stream_number: i32,
    pub stream_name: String,
    pub end_deliverable: Option<String>,
    pub self_status: Option<StreamSelfStatus>,
    pub support_type: Option<SupportType>,
    pub support_type_other: Option<String>,
    pub owner_name: Option<String>,
    pub target_quarter: Option<String>,
    pub rag_status: Option<RagStatus>,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl VentureStream {
    pub fn new(
        id: impl Into<String>,
        created_at: Millis,
        venture_id: impl Into<String>,
        definition: &StreamDefinition,
    ) -> Self {
        Self {
            id: id.into(),
            venture_id: venture_id.into(),
            stream_number: definition.number,
            stream_name: definition.name.to_string(),
            end_deliverable: None,
            self_status: None,
            support_type: None,
            support_type_other: None,
            owner_name: None,
            target_quarter: None,
            rag_status: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn needs_help(&self) -> bool {
        self.self_status == Some(StreamSelfStatus::NeedHelp)
    }

    /// Record the self-assessment; support fields survive only on need_help
    pub fn assess(
        &mut self,
        self_status: StreamSelfStatus,
        support_type: Option<SupportType>,
        support_type_other: Option<String>,
    ) {
        self.self_status = Some(self_status);
        if self_status == StreamSelfStatus::NeedHelp {
            self.support_type = support_type;
            self.support_type_other = match support_type {
                Some(SupportType::Other) => support_type_other.filter(|s| !s.trim().is_empty()),
                _ => None,
            };
        } else {
            self.support_type = None;
            self.support_type_other = None;
        }
    }
}

/// Ordered checklist item under a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDeliverable {
    pub id: EntityId,
    pub stream_id: EntityId,
    pub sequence_number: i32,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<String>,
    pub status: DeliverableStatus,
    pub is_current: bool,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl StreamDeliverable {
    pub fn new(
        id: impl Into<String>,
        created_at: Millis,
        stream_id: impl Into<String>,
        sequence_number: i32,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            stream_id: stream_id.into(),
            sequence_number,
            title: title.into(),
            description: None,
            target_date: None,
            status: DeliverableStatus::Pending,
            is_current: sequence_number == 1,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Apply a status change to one deliverable of a stream and keep exactly one
/// current marker.
///
/// Completing the current deliverable hands the marker to the next
/// incomplete deliverable by sequence; if none remain the completed one keeps
/// it. Returns the deliverables whose row changed.
pub fn apply_deliverable_status(
    deliverables: &mut [StreamDeliverable],
    deliverable_id: &str,
    status: DeliverableStatus,
    now_millis: Millis,
) -> Result<Vec<StreamDeliverable>> {
    deliverables.sort_by_key(|d| d.sequence_number);

    let index = deliverables
        .iter()
        .position(|d| d.id == deliverable_id)
        .ok_or_else(|| {
            DomainError::ValidationError(format!(
                "Deliverable {} does not belong to this stream",
                deliverable_id
            ))
        })?;

    let mut changed = vec![index];
    deliverables[index].status = status;
    deliverables[index].updated_at = now_millis;

    if status == DeliverableStatus::Completed && deliverables[index].is_current {
        let next = deliverables
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, d)| d.status != DeliverableStatus::Completed)
            .map(|(i, _)| i);

        if let Some(next) = next {
            deliverables[index].is_current = false;
            deliverables[next].is_current = true;
            deliverables[next].updated_at = now_millis;
            changed.push(next);
        }
    }

    Ok(changed.into_iter().map(|i| deliverables[i].clone()).collect())
}
