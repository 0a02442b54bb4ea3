// Application Layer - Use Cases and Business Logic
//
// Every use case takes the explicit SessionContext of the caller; there is no
// process-wide "current user".

pub mod agreement;
pub mod approval;
pub mod auth;
pub mod cache;
pub mod dashboard;
pub mod engagement;
pub mod maintenance;
pub mod navigation;
pub mod streams;
pub mod triage;
pub mod ventures;
pub mod wizard;

// Re-exports
pub use auth::SessionContext;
pub use cache::{CacheKey, CacheTopic, Mutation, QueryCache};
pub use maintenance::MaintenanceScheduler;
pub use navigation::Route;

use crate::domain::Venture;
use crate::error::{AppError, Result};
use crate::port::{
    AgreementRepository, ApprovalChainRepository, AuthBackend, ContentGenerator, DraftStore,
    EngagementRepository, IdProvider, ProfileRepository, ReviewRepository, StreamRepository,
    TimeProvider, VentureRepository,
};
use std::sync::Arc;

/// Every collaborator a use case may reach, injected at the composition root
#[derive(Clone)]
pub struct Ports {
    pub profiles: Arc<dyn ProfileRepository>,
    pub ventures: Arc<dyn VentureRepository>,
    pub streams: Arc<dyn StreamRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub approvals: Arc<dyn ApprovalChainRepository>,
    pub agreements: Arc<dyn AgreementRepository>,
    pub engagement: Arc<dyn EngagementRepository>,
    pub auth: Arc<dyn AuthBackend>,
    pub drafts: Arc<dyn DraftStore>,
    pub content: Arc<dyn ContentGenerator>,
    pub ids: Arc<dyn IdProvider>,
    pub clock: Arc<dyn TimeProvider>,
}

impl Ports {
    pub(crate) async fn load_venture(&self, venture_id: &str) -> Result<Venture> {
        self.ventures
            .find_by_id(venture_id)
            .await?
            .ok_or_else(|| AppError::not_found("Venture", venture_id))
    }

    /// Load a venture the caller may see: staff see every venture, an
    /// entrepreneur only their own.
    pub(crate) async fn visible_venture(
        &self,
        ctx: &SessionContext,
        venture_id: &str,
    ) -> Result<Venture> {
        let venture = self.load_venture(venture_id).await?;
        if ctx.role().is_staff() || venture.is_owned_by(ctx.profile_id()) {
            Ok(venture)
        } else {
            Err(AppError::Forbidden(format!(
                "Venture {} belongs to another entrepreneur",
                venture_id
            )))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing;
