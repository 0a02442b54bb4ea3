// Port Layer - Interfaces for external dependencies
//
// Storage, query and authentication are delegated to a hosted backend;
// every reach into it goes through one of these traits.

pub mod agreement_repository;
pub mod approval_repository;
pub mod auth_backend;
pub mod content_generator;
pub mod draft_store;
pub mod engagement_repository;
pub mod id_provider; // For deterministic testing
pub mod maintenance;
pub mod profile_repository;
pub mod review_repository;
pub mod stream_repository;
pub mod time_provider;
pub mod venture_repository;

// Re-exports
pub use agreement_repository::AgreementRepository;
pub use approval_repository::ApprovalChainRepository;
pub use auth_backend::{AuthBackend, AuthSession, AuthUser, SignUpMetadata};
pub use content_generator::{ContentGenerator, TemplateContentGenerator};
pub use draft_store::{DraftStore, InMemoryDraftStore};
pub use engagement_repository::EngagementRepository;
pub use id_provider::IdProvider;
pub use maintenance::{Maintenance, MaintenanceConfig, MaintenanceStats};
pub use profile_repository::ProfileRepository;
pub use review_repository::ReviewRepository;
pub use stream_repository::StreamRepository;
pub use time_provider::TimeProvider;
pub use venture_repository::{VentureFilter, VentureRepository};
