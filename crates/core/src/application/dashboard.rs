// Role dashboards: one widget table keyed by role

use super::{Ports, SessionContext};
use crate::domain::{
    AgreementStatus, MentorRequestStatus, RagStatus, Role, Venture, VentureStatus,
};
use crate::error::Result;
use crate::port::VentureFilter;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardWidget {
    MyVenture,
    MyStreams,
    MyAgreement,
    NextAction,
    AssignedVentures,
    Portfolio,
    ActiveVentures,
    AtRiskCount,
    OnTrackCount,
    ApplicationQueue,
    PendingApprovals,
    PendingMentorRequests,
    ActiveMentorRequests,
    TotalVentures,
    TotalUsers,
    VenturesByStatus,
    UsersByRole,
}

use DashboardWidget::*;

pub fn widgets_for(role: Role) -> &'static [DashboardWidget] {
    match role {
        Role::Entrepreneur => &[MyVenture, MyStreams, MyAgreement, NextAction],
        Role::VenturePartner => &[AssignedVentures, AtRiskCount],
        Role::Mentor => &[PendingMentorRequests, ActiveMentorRequests],
        Role::SuccessManager => &[Portfolio, AtRiskCount, OnTrackCount, ApplicationQueue],
        Role::FieldHead => &[ActiveVentures, PendingApprovals, AtRiskCount, OnTrackCount],
        Role::SelectionManager | Role::SelectionCommittee => &[ApplicationQueue, PendingApprovals],
        Role::SuperAdmin => &[TotalVentures, TotalUsers, VenturesByStatus, UsersByRole],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetValue {
    pub widget: DashboardWidget,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub role: Role,
    pub widgets: Vec<WidgetValue>,
}

/// Ventures the role's risk widgets count over
async fn portfolio(ports: &Ports, ctx: &SessionContext) -> Result<Vec<Venture>> {
    let filter = match ctx.role() {
        Role::VenturePartner => VentureFilter {
            venture_partner_id: Some(ctx.profile_id().to_string()),
            ..Default::default()
        },
        Role::SuccessManager => VentureFilter {
            success_manager_id: Some(ctx.profile_id().to_string()),
            ..Default::default()
        },
        _ => VentureFilter::with_statuses(&[VentureStatus::Approved, VentureStatus::Active]),
    };
    ports.ventures.list(&filter).await
}

fn is_at_risk(venture: &Venture) -> bool {
    venture.overall_rag == Some(RagStatus::Red)
}

fn is_on_track(venture: &Venture) -> bool {
    matches!(venture.overall_rag, Some(RagStatus::Green) | Some(RagStatus::Complete))
}

fn next_action(venture: Option<&Venture>, agreement_pending: bool) -> &'static str {
    let Some(venture) = venture else {
        return "Start your application";
    };
    match venture.status {
        VentureStatus::Draft => "Finish and submit your application",
        VentureStatus::Submitted => "Your application is waiting for triage",
        VentureStatus::UnderReview => "Your application is with the approval panel",
        VentureStatus::Approved if agreement_pending => "Review and accept your support agreement",
        VentureStatus::Approved => "Your support agreement is being prepared",
        VentureStatus::Active => "Keep your stream progress up to date",
        VentureStatus::SelfServe => "Use the self-serve resources for your venture",
        VentureStatus::Rejected | VentureStatus::Dropped => "Start a new application",
        VentureStatus::Completed => "Program complete",
    }
}

pub async fn dashboard(ports: &Ports, ctx: &SessionContext) -> Result<Dashboard> {
    let role = ctx.role();
    let mut widgets = Vec::new();

    for widget in widgets_for(role) {
        let value = match widget {
            MyVenture | MyStreams | MyAgreement | NextAction => {
                let venture = ports.ventures.find_latest_for_entrepreneur(ctx.profile_id()).await?;
                match widget {
                    MyVenture => json!(venture),
                    MyStreams => match &venture {
                        Some(v) => json!(ports.streams.list_for_venture(&v.id).await?),
                        None => json!([]),
                    },
                    MyAgreement => match &venture {
                        Some(v) => json!(ports.agreements.find_latest_for_venture(&v.id).await?),
                        None => Value::Null,
                    },
                    _ => {
                        let agreement_pending = match &venture {
                            Some(v) => ports
                                .agreements
                                .find_latest_for_venture(&v.id)
                                .await?
                                .is_some_and(|a| a.status == AgreementStatus::Pending),
                            None => false,
                        };
                        json!(next_action(venture.as_ref(), agreement_pending))
                    }
                }
            }
            AssignedVentures | Portfolio | ActiveVentures => json!(portfolio(ports, ctx).await?),
            AtRiskCount => json!(portfolio(ports, ctx).await?.iter().filter(|v| is_at_risk(v)).count()),
            OnTrackCount => json!(portfolio(ports, ctx).await?.iter().filter(|v| is_on_track(v)).count()),
            ApplicationQueue => {
                json!(ports.ventures.list(&VentureFilter::with_statuses(&[VentureStatus::Submitted])).await?)
            }
            PendingApprovals => {
                json!(super::approval::pending_for(ports, ctx).await?.len())
            }
            PendingMentorRequests | ActiveMentorRequests => {
                let want = if *widget == PendingMentorRequests {
                    MentorRequestStatus::Pending
                } else {
                    MentorRequestStatus::Accepted
                };
                let requests: Vec<_> = ports
                    .engagement
                    .list_mentor_requests(Some(ctx.profile_id()))
                    .await?
                    .into_iter()
                    .filter(|r| r.status == want)
                    .collect();
                json!(requests)
            }
            TotalVentures => {
                let total: i64 = ports.ventures.count_by_status().await?.iter().map(|(_, n)| n).sum();
                json!(total)
            }
            TotalUsers => json!(ports.profiles.list_all().await?.len()),
            VenturesByStatus => {
                let counts: serde_json::Map<String, Value> = ports
                    .ventures
                    .count_by_status()
                    .await?
                    .into_iter()
                    .map(|(status, n)| (status.to_string(), json!(n)))
                    .collect();
                Value::Object(counts)
            }
            UsersByRole => {
                let counts: serde_json::Map<String, Value> = ports
                    .profiles
                    .count_by_role()
                    .await?
                    .into_iter()
                    .map(|(role, n)| (role.to_string(), json!(n)))
                    .collect();
                Value::Object(counts)
            }
        };
        widgets.push(WidgetValue {
            widget: *widget,
            value,
        });
    }

    Ok(Dashboard { role, widgets })
}
