// Venture queries scoped by role, and staff completion

use super::{Ports, SessionContext};
use crate::domain::{Role, Venture, VentureStatus};
use crate::error::{AppError, Result};
use crate::port::VentureFilter;
use tracing::info;

/// Ventures visible to the caller, newest first.
///
/// Entrepreneurs see their own, venture partners the ventures assigned to
/// them, every other staff role sees all of them.
pub async fn list(ports: &Ports, ctx: &SessionContext, statuses: &[VentureStatus]) -> Result<Vec<Venture>> {
    let mut filter = VentureFilter::with_statuses(statuses);
    match ctx.role() {
        Role::Entrepreneur => filter.entrepreneur_id = Some(ctx.profile_id().to_string()),
        Role::VenturePartner => filter.venture_partner_id = Some(ctx.profile_id().to_string()),
        _ => {}
    }
    ports.ventures.list(&filter).await
}

pub async fn get(ports: &Ports, ctx: &SessionContext, venture_id: &str) -> Result<Venture> {
    ports.visible_venture(ctx, venture_id).await
}

/// The caller's most recent venture
pub async fn mine(ports: &Ports, ctx: &SessionContext) -> Result<Option<Venture>> {
    ports
        .ventures
        .find_latest_for_entrepreneur(ctx.profile_id())
        .await
}

/// Close out an active venture
pub async fn complete(ports: &Ports, ctx: &SessionContext, venture_id: &str) -> Result<Venture> {
    if !ctx.role().can_complete_venture() {
        return Err(AppError::Forbidden(format!("{} cannot complete ventures", ctx.role())));
    }

    let mut venture = ports.load_venture(venture_id).await?;
    venture.transition(VentureStatus::Completed, ports.clock.now_millis())?;
    ports.ventures.update(&venture).await?;

    info!(venture_id = %venture.id, "Venture completed");
    Ok(venture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{TestBackend, T0};

    fn seed(backend: &TestBackend) {
        for (id, owner, status) in [
            ("v-1", "e-1", VentureStatus::Active),
            ("v-2", "e-2", VentureStatus::Submitted),
            ("v-3", "e-1", VentureStatus::Draft),
        ] {
            let mut v = Venture::new(id, T0 + id.len() as i64, owner);
            v.status = status;
            if id == "v-2" {
                v.venture_partner_id = Some("vp-1".to_string());
            }
            backend.put_venture(&v);
        }
    }

    #[tokio::test]
    async fn test_list_is_scoped_by_role() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        seed(&backend);

        let e1 = backend.login("e-1", Role::Entrepreneur);
        let vp = backend.login("vp-1", Role::VenturePartner);
        let fh = backend.login("fh-1", Role::FieldHead);

        assert_eq!(list(&ports, &e1, &[]).await.unwrap().len(), 2);
        let vp_list = list(&ports, &vp, &[]).await.unwrap();
        assert_eq!(vp_list.len(), 1);
        assert_eq!(vp_list[0].id, "v-2");
        assert_eq!(list(&ports, &fh, &[]).await.unwrap().len(), 3);
        assert_eq!(list(&ports, &fh, &[VentureStatus::Active]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_requires_active_and_role() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        seed(&backend);
        let csm = backend.login("csm-1", Role::SuccessManager);
        let mentor = backend.login("m-1", Role::Mentor);

        assert!(matches!(
            complete(&ports, &mentor, "v-1").await.unwrap_err(),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            complete(&ports, &csm, "v-2").await.unwrap_err(),
            AppError::Domain(_)
        ));
        let done = complete(&ports, &csm, "v-1").await.unwrap();
        assert_eq!(done.status, VentureStatus::Completed);
    }

    #[tokio::test]
    async fn test_get_hides_other_entrepreneurs_venture() {
        let backend = TestBackend::new();
        seed(&backend);
        let e1 = backend.login("e-1", Role::Entrepreneur);

        assert!(matches!(
            get(&backend.ports(), &e1, "v-2").await.unwrap_err(),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            get(&backend.ports(), &e1, "v-404").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
