// Accelerate Infrastructure - SQLite Adapter
// Implements every repository port, the AuthBackend and Maintenance

mod agreement_repository;
mod approval_repository;
mod auth_backend;
mod connection;
mod engagement_repository;
mod error;
mod maintenance_impl;
mod migration;
mod profile_repository;
mod review_repository;
mod stream_repository;
mod venture_repository;

pub use agreement_repository::SqliteAgreementRepository;
pub use approval_repository::SqliteApprovalChainRepository;
pub use auth_backend::SqliteAuthBackend;
pub use connection::{create_pool, database_url};
pub use engagement_repository::SqliteEngagementRepository;
pub use maintenance_impl::SqliteMaintenance;
pub use migration::run_migrations;
pub use profile_repository::SqliteProfileRepository;
pub use review_repository::SqliteReviewRepository;
pub use stream_repository::SqliteStreamRepository;
pub use venture_repository::SqliteVentureRepository;

use accelerate_core::application::Ports;
use accelerate_core::port::id_provider::UuidProvider;
use accelerate_core::port::time_provider::SystemTimeProvider;
use accelerate_core::port::{InMemoryDraftStore, TemplateContentGenerator, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Wire every port onto one pool with the production clock and id source
pub fn build_ports(pool: SqlitePool, session_ttl_hours: i64) -> Ports {
    build_ports_with_clock(pool, session_ttl_hours, Arc::new(SystemTimeProvider))
}

pub fn build_ports_with_clock(
    pool: SqlitePool,
    session_ttl_hours: i64,
    clock: Arc<dyn TimeProvider>,
) -> Ports {
    Ports {
        profiles: Arc::new(SqliteProfileRepository::new(pool.clone())),
        ventures: Arc::new(SqliteVentureRepository::new(pool.clone())),
        streams: Arc::new(SqliteStreamRepository::new(pool.clone())),
        reviews: Arc::new(SqliteReviewRepository::new(pool.clone())),
        approvals: Arc::new(SqliteApprovalChainRepository::new(pool.clone())),
        agreements: Arc::new(SqliteAgreementRepository::new(pool.clone())),
        engagement: Arc::new(SqliteEngagementRepository::new(pool.clone())),
        auth: Arc::new(SqliteAuthBackend::new(pool, clock.clone(), session_ttl_hours)),
        drafts: Arc::new(InMemoryDraftStore::new()),
        content: Arc::new(TemplateContentGenerator),
        ids: Arc::new(UuidProvider),
        clock,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use accelerate_core::domain::{Profile, Role, Venture};
    use accelerate_core::port::{ProfileRepository, VentureRepository};

    pub async fn test_pool() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    pub async fn seed_profile(pool: &SqlitePool, id: &str, role: Role) {
        SqliteProfileRepository::new(pool.clone())
            .upsert(&Profile::new(id, 0, id, format!("{}@accelerate.test", id), role))
            .await
            .unwrap();
    }

    /// Fresh database holding entrepreneur `e-1` and one draft venture
    pub async fn seed_venture(id: &str) -> SqlitePool {
        let pool = test_pool().await;
        seed_profile(&pool, "e-1", Role::Entrepreneur).await;
        SqliteVentureRepository::new(pool.clone())
            .insert(&Venture::new(id, 0, "e-1"))
            .await
            .unwrap();
        pool
    }
}
