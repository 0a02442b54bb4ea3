//! Accelerate SDK - Rust Client Library
//!
//! A signed-in client for the Accelerate daemon. Reads are cached per client
//! and dropped when a write through the same client makes them stale.
//!
//! # Example
//!
//! ```no_run
//! use accelerate_sdk::AccelerateClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AccelerateClient::connect("http://127.0.0.1:9630").await?;
//!     let nav = client.sign_in("asha@example.com", "correct horse").await?;
//!     println!("Landing on {}", nav.navigation.landing);
//!
//!     if let Some(venture) = client.my_venture().await? {
//!         println!("{} is {}", venture.id, venture.status);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod params;

pub use client::AccelerateClient;
pub use error::{Result, SdkError};

// Wire types, re-exported so callers need only this crate
pub use accelerate_api_rpc::types::{MaintenanceResponse, SignInResponse};
pub use accelerate_core::application::agreement::{AgreementOutcome, AgreementResponse};
pub use accelerate_core::application::approval::{DecisionOutcome, DecisionRequest, PendingApproval};
pub use accelerate_core::application::auth::SignUpRequest;
pub use accelerate_core::application::dashboard::Dashboard;
pub use accelerate_core::application::engagement::{
    HoursSummary, LogEngagementRequest, MentorRequestInput, RecordSessionRequest,
};
pub use accelerate_core::application::navigation::NavigationView;
pub use accelerate_core::application::streams::{StreamUpdate, StreamUpdateOutcome, StreamWithDeliverables};
pub use accelerate_core::application::triage::{TriageRequest, TriageResult};
pub use accelerate_core::application::wizard::{ApplicationDraft, SupportNeeds};
pub use accelerate_core::application::SessionContext;
