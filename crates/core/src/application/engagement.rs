// Sessions, mentor requests and engagement hours

use super::{Ports, SessionContext};
use crate::domain::{
    EngagementAction, EngagementLog, MentorRequest, MentorRequestStatus, Role, Session,
    SessionSummary, SessionType,
};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

fn require_staff(ctx: &SessionContext, action: &str) -> Result<()> {
    if ctx.role().is_staff() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("{} cannot {}", ctx.role(), action)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSessionRequest {
    pub venture_id: String,
    pub session_type: SessionType,
    #[serde(default)]
    pub recording_url: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub summary: Option<SessionSummary>,
    /// Defaults to now
    #[serde(default)]
    pub session_date: Option<i64>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
}

pub async fn record_session(ports: &Ports, ctx: &SessionContext, req: RecordSessionRequest) -> Result<Session> {
    require_staff(ctx, "record sessions")?;
    ports.load_venture(&req.venture_id).await?;
    if req.duration_minutes.is_some_and(|m| m <= 0) {
        return Err(AppError::Validation("Session duration must be positive".to_string()));
    }

    let now = ports.clock.now_millis();
    let session = Session {
        id: ports.ids.generate_id(),
        venture_id: req.venture_id,
        session_type: req.session_type,
        conducted_by: ctx.profile_id().to_string(),
        recording_url: req.recording_url,
        transcript: req.transcript,
        summary: req.summary,
        session_date: req.session_date.unwrap_or(now),
        duration_minutes: req.duration_minutes,
        created_at: now,
    };
    ports.engagement.insert_session(&session).await?;

    info!(venture_id = %session.venture_id, session_type = %session.session_type, "Session recorded");
    Ok(session)
}

/// Sessions of a venture, newest first
pub async fn list_sessions(ports: &Ports, ctx: &SessionContext, venture_id: &str) -> Result<Vec<Session>> {
    ports.visible_venture(ctx, venture_id).await?;
    ports.engagement.list_sessions(venture_id).await
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorRequestInput {
    pub stream_id: String,
    pub mentor_id: String,
    #[serde(default)]
    pub request_details: Option<String>,
    #[serde(default)]
    pub briefing: Option<String>,
}

/// Ask a mentor for help on one stream; the owner or staff may ask
pub async fn request_mentor(ports: &Ports, ctx: &SessionContext, input: MentorRequestInput) -> Result<MentorRequest> {
    let stream = ports
        .streams
        .find_by_id(&input.stream_id)
        .await?
        .ok_or_else(|| AppError::not_found("Stream", &input.stream_id))?;
    ports.visible_venture(ctx, &stream.venture_id).await?;

    let mentor = ports
        .profiles
        .find_by_id(&input.mentor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile", &input.mentor_id))?;
    if mentor.role != Role::Mentor {
        return Err(AppError::Validation(format!("{} is not a mentor", mentor.id)));
    }

    let mut request = MentorRequest::new(
        ports.ids.generate_id(),
        ports.clock.now_millis(),
        &stream.venture_id,
        &stream.id,
        &mentor.id,
    );
    request.request_details = input.request_details;
    request.briefing = input.briefing;
    ports.engagement.insert_mentor_request(&request).await?;

    info!(venture_id = %request.venture_id, mentor_id = %request.mentor_id, "Mentor requested");
    Ok(request)
}

/// Mentors see their own requests, staff see all, entrepreneurs those of their ventures
pub async fn list_mentor_requests(ports: &Ports, ctx: &SessionContext) -> Result<Vec<MentorRequest>> {
    match ctx.role() {
        Role::Mentor => ports.engagement.list_mentor_requests(Some(ctx.profile_id())).await,
        Role::Entrepreneur => {
            let mut own = Vec::new();
            for request in ports.engagement.list_mentor_requests(None).await? {
                if let Some(venture) = ports.ventures.find_by_id(&request.venture_id).await? {
                    if venture.is_owned_by(ctx.profile_id()) {
                        own.push(request);
                    }
                }
            }
            Ok(own)
        }
        _ => ports.engagement.list_mentor_requests(None).await,
    }
}

pub async fn respond_mentor_request(
    ports: &Ports,
    ctx: &SessionContext,
    request_id: &str,
    status: MentorRequestStatus,
) -> Result<MentorRequest> {
    let mut request = ports
        .engagement
        .find_mentor_request(request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Mentor request", request_id))?;

    if request.mentor_id != ctx.profile_id() {
        return Err(AppError::Forbidden(
            "Only the assigned mentor can respond to this request".to_string(),
        ));
    }

    request.respond(status, ports.clock.now_millis())?;
    ports.engagement.update_mentor_request(&request).await?;

    info!(request_id, status = %request.status, "Mentor request updated");
    Ok(request)
}

/// Upper bound for a single logged action
pub const MAX_HOURS_PER_LOG: i64 = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEngagementRequest {
    pub venture_id: String,
    pub stream_id: String,
    pub action_type: EngagementAction,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub hours_consumed: i64,
}

pub async fn log_engagement(ports: &Ports, ctx: &SessionContext, req: LogEngagementRequest) -> Result<EngagementLog> {
    require_staff(ctx, "log engagement")?;
    if !(0..=MAX_HOURS_PER_LOG).contains(&req.hours_consumed) {
        return Err(AppError::Validation(format!(
            "Hours consumed must be between 0 and {}",
            MAX_HOURS_PER_LOG
        )));
    }
    let stream = ports
        .streams
        .find_by_id(&req.stream_id)
        .await?
        .ok_or_else(|| AppError::not_found("Stream", &req.stream_id))?;
    if stream.venture_id != req.venture_id {
        return Err(AppError::Validation(format!(
            "Stream {} does not belong to venture {}",
            stream.id, req.venture_id
        )));
    }

    let log = EngagementLog {
        id: ports.ids.generate_id(),
        venture_id: req.venture_id,
        stream_id: req.stream_id,
        action_type: req.action_type,
        details: req.details,
        hours_consumed: req.hours_consumed,
        created_at: ports.clock.now_millis(),
    };
    ports.engagement.insert_log(&log).await?;
    Ok(log)
}

pub async fn list_logs(ports: &Ports, ctx: &SessionContext, venture_id: &str) -> Result<Vec<EngagementLog>> {
    ports.visible_venture(ctx, venture_id).await?;
    ports.engagement.list_logs(venture_id).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursSummary {
    pub total: i64,
    pub consumed: i64,
    pub remaining: i64,
}

impl HoursSummary {
    pub fn new(total: i64, consumed: i64) -> Self {
        Self {
            total,
            consumed,
            remaining: total.saturating_sub(consumed).max(0),
        }
    }
}

/// Agreement hours against hours logged so far
pub async fn hours_summary(ports: &Ports, ctx: &SessionContext, venture_id: &str) -> Result<HoursSummary> {
    ports.visible_venture(ctx, venture_id).await?;

    let total = ports
        .agreements
        .find_latest_for_venture(venture_id)
        .await?
        .filter(|a| a.is_live())
        .map_or(0, |a| a.total_support_hours);
    let consumed = ports
        .engagement
        .list_logs(venture_id)
        .await?
        .iter()
        .fold(0i64, |acc, l| acc.saturating_add(l.hours_consumed));

    Ok(HoursSummary::new(total, consumed))
}
