// Engagement records: sessions, mentor requests, engagement logs

use super::error::{DomainError, Result};
use super::{EntityId, Millis};
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum SessionType: "session type" {
        VenturePartnerCheckin => "venture_partner_checkin",
        MentorSession => "mentor_session",
        Interview => "interview",
    }
}

/// Structured summary of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub challenges: Vec<String>,
    pub action_items_beneficiary: Vec<String>,
    pub action_items_foundation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: EntityId,
    pub venture_id: EntityId,
    pub session_type: SessionType,
    pub conducted_by: EntityId,
    pub recording_url: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<SessionSummary>,
    pub session_date: Millis,
    pub duration_minutes: Option<i64>,
    pub created_at: Millis,
}

wire_enum! {
    pub enum MentorRequestStatus: "mentor request status" {
        Pending => "pending",
        Accepted => "accepted",
        Declined => "declined",
        Completed => "completed",
    }
}

impl MentorRequestStatus {
    pub fn can_transition_to(&self, next: MentorRequestStatus) -> bool {
        use MentorRequestStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Declined) | (Accepted, Completed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorRequest {
    pub id: EntityId,
    pub venture_id: EntityId,
    pub stream_id: EntityId,
    pub mentor_id: EntityId,
    pub request_details: Option<String>,
    pub briefing: Option<String>,
    pub status: MentorRequestStatus,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl MentorRequest {
    pub fn new(
        id: impl Into<String>,
        created_at: Millis,
        venture_id: impl Into<String>,
        stream_id: impl Into<String>,
        mentor_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            venture_id: venture_id.into(),
            stream_id: stream_id.into(),
            mentor_id: mentor_id.into(),
            request_details: None,
            briefing: None,
            status: MentorRequestStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn respond(&mut self, next: MentorRequestStatus, now_millis: Millis) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::transition("mentor request", self.status, next));
        }
        self.status = next;
        self.updated_at = now_millis;
        Ok(())
    }
}

wire_enum! {
    pub enum EngagementAction: "engagement action" {
        Learn => "learn",
        Connect => "connect",
        Do => "do",
    }
}

/// Support hours consumed against a venture's agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementLog {
    pub id: EntityId,
    pub venture_id: EntityId,
    pub stream_id: EntityId,
    pub action_type: EngagementAction,
    pub details: Option<serde_json::Value>,
    pub hours_consumed: i64,
    pub created_at: Millis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentor_request_flow() {
        let mut r = MentorRequest::new("m-1", 1000, "v-1", "s-1", "p-1");
        r.respond(MentorRequestStatus::Accepted, 2000).unwrap();
        r.respond(MentorRequestStatus::Completed, 3000).unwrap();
        assert_eq!(r.status, MentorRequestStatus::Completed);
    }

    #[test]
    fn test_declined_request_cannot_complete() {
        let mut r = MentorRequest::new("m-1", 1000, "v-1", "s-1", "p-1");
        r.respond(MentorRequestStatus::Declined, 2000).unwrap();
        assert!(r.respond(MentorRequestStatus::Completed, 3000).is_err());
    }
}
