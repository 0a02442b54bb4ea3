//! Rejections, declines and partial failures of the approval flow

mod common;

use accelerate_core::application::agreement::{self, AgreementResponse};
use accelerate_core::application::approval::{self, DecisionRequest};
use accelerate_core::application::triage::{self, TriageRequest};
use accelerate_core::application::{streams, ventures};
use accelerate_core::domain::{ApprovalStatus, Role, TriageOutcome, VentureStatus};
use accelerate_core::AppError;
use common::{core_needs, Harness};

fn decision(item_id: &str, decision: ApprovalStatus) -> DecisionRequest {
    DecisionRequest {
        item_id: item_id.to_string(),
        decision,
        notes: Some("Reviewed".to_string()),
    }
}

/// Item waiting on `role` in the venture's chain
async fn item_for(h: &Harness, venture_id: &str, role: Role) -> String {
    h.ports
        .approvals
        .list_for_venture(venture_id)
        .await
        .unwrap()
        .into_iter()
        .find(|i| i.approver_role == role)
        .unwrap()
        .id
}

#[tokio::test]
async fn test_field_head_rejection_ends_review() {
    let h = Harness::new().await;
    let staff = h.staff().await;
    let founder = h.user("asha@example.com", Role::Entrepreneur).await;
    let venture = h.apply(&founder, core_needs()).await;
    h.triage(&staff.csm, &venture.id, TriageOutcome::Core).await;

    let item = item_for(&h, &venture.id, Role::FieldHead).await;
    let outcome = approval::decide(&h.ports, &staff.field_head, decision(&item, ApprovalStatus::Rejected))
        .await
        .unwrap();
    assert_eq!(outcome.venture_status, VentureStatus::Rejected);
    assert!(outcome.agreement.is_none());
    assert!(agreement::get(&h.ports, &founder, &venture.id).await.unwrap().is_none());

    // The later item stays pending, but its approver can no longer act
    let chain = h.ports.approvals.list_for_venture(&venture.id).await.unwrap();
    assert_eq!(chain[2].status, ApprovalStatus::Pending);
    assert!(approval::pending_for(&h.ports, &staff.selection_manager).await.unwrap().is_empty());
    let item = item_for(&h, &venture.id, Role::SelectionManager).await;
    let err = approval::decide(&h.ports, &staff.selection_manager, decision(&item, ApprovalStatus::Approved))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn test_declined_agreement_drops_venture() {
    let h = Harness::new().await;
    let staff = h.staff().await;
    let founder = h.user("asha@example.com", Role::Entrepreneur).await;
    let venture = h.apply(&founder, core_needs()).await;
    h.triage(&staff.csm, &venture.id, TriageOutcome::Prime).await;

    let item = item_for(&h, &venture.id, Role::FieldHead).await;
    let outcome = approval::decide(&h.ports, &staff.field_head, decision(&item, ApprovalStatus::Approved))
        .await
        .unwrap();
    let generated = outcome.agreement.unwrap();

    // Only the owner answers
    let err = agreement::respond(&h.ports, &staff.csm, &generated.id, AgreementResponse::Decline)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let declined = agreement::respond(&h.ports, &founder, &generated.id, AgreementResponse::Decline)
        .await
        .unwrap();
    assert_eq!(declined.venture_status, VentureStatus::Dropped);
    assert_eq!(declined.deliverables_created, 0);

    let plan = streams::list(&h.ports, &founder, &venture.id).await.unwrap();
    assert!(plan.iter().all(|s| s.deliverables.is_empty()));

    // A dropped venture cannot be re-activated through the same agreement
    let err = agreement::respond(&h.ports, &founder, &generated.id, AgreementResponse::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn test_only_assigned_approver_decides() {
    let h = Harness::new().await;
    let staff = h.staff().await;
    let founder = h.user("asha@example.com", Role::Entrepreneur).await;
    let venture = h.apply(&founder, core_needs()).await;
    h.triage(&staff.csm, &venture.id, TriageOutcome::Core).await;

    let item = item_for(&h, &venture.id, Role::FieldHead).await;
    for intruder in [&staff.selection_manager, &founder] {
        let err = approval::decide(&h.ports, intruder, decision(&item, ApprovalStatus::Approved))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}

#[tokio::test]
async fn test_missing_approver_blocks_triage_before_any_write() {
    let h = Harness::new().await;
    let csm = h.user("csm@example.com", Role::SuccessManager).await;
    h.user("fh@example.com", Role::FieldHead).await;
    let founder = h.user("asha@example.com", Role::Entrepreneur).await;
    let venture = h.apply(&founder, core_needs()).await;

    // No selection manager exists for the core chain
    let err = triage::triage(
        &h.ports,
        &csm,
        TriageRequest {
            venture_id: venture.id.clone(),
            outcome: TriageOutcome::Core,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    assert_eq!(h.venture(&venture.id).await.status, VentureStatus::Submitted);
    assert!(h.ports.approvals.list_for_venture(&venture.id).await.unwrap().is_empty());
    assert!(h.ports.reviews.find_latest_for_venture(&venture.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_entrepreneurs_are_scoped_to_their_venture() {
    let h = Harness::new().await;
    let founder = h.user("asha@example.com", Role::Entrepreneur).await;
    let other = h.user("ravi@example.com", Role::Entrepreneur).await;
    let venture = h.apply(&founder, core_needs()).await;

    let err = ventures::get(&h.ports, &other, &venture.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = triage::latest_review(&h.ports, &founder, &venture.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let visible = ventures::list(&h.ports, &other, &[]).await.unwrap();
    assert!(visible.is_empty());
}

/// The final approval writes step by step without a transaction: when
/// agreement generation fails the venture stays approved with no agreement.
#[tokio::test]
async fn test_failed_agreement_leaves_venture_approved() {
    let h = Harness::new().await;
    let staff = h.staff().await;
    let founder = h.user("asha@example.com", Role::Entrepreneur).await;
    let venture = h.apply(&founder, core_needs()).await;
    h.triage(&staff.csm, &venture.id, TriageOutcome::Prime).await;

    sqlx::query("DROP TABLE agreements").execute(&h.pool).await.unwrap();

    let item = item_for(&h, &venture.id, Role::FieldHead).await;
    let err = approval::decide(&h.ports, &staff.field_head, decision(&item, ApprovalStatus::Approved))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    let stranded = h.venture(&venture.id).await;
    assert_eq!(stranded.status, VentureStatus::Approved);
    assert!(stranded.success_manager_id.is_none());

    let chain = h.ports.approvals.list_for_venture(&venture.id).await.unwrap();
    assert!(chain.iter().all(|i| i.status == ApprovalStatus::Approved));
}
