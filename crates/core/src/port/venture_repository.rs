// Venture Repository Port (Interface)

use crate::domain::{Venture, VentureStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Row filter for venture listings. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VentureFilter {
    pub entrepreneur_id: Option<String>,
    pub venture_partner_id: Option<String>,
    pub success_manager_id: Option<String>,
    pub statuses: Vec<VentureStatus>,
}

impl VentureFilter {
    pub fn owned_by(entrepreneur_id: impl Into<String>) -> Self {
        Self {
            entrepreneur_id: Some(entrepreneur_id.into()),
            ..Default::default()
        }
    }

    pub fn with_statuses(statuses: &[VentureStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Default::default()
        }
    }

    pub fn matches(&self, venture: &Venture) -> bool {
        let eq = |want: &Option<String>, have: &Option<String>| match want {
            Some(w) => have.as_deref() == Some(w.as_str()),
            None => true,
        };
        self.entrepreneur_id
            .as_deref()
            .map_or(true, |id| venture.entrepreneur_id == id)
            && eq(&self.venture_partner_id, &venture.venture_partner_id)
            && eq(&self.success_manager_id, &venture.success_manager_id)
            && (self.statuses.is_empty() || self.statuses.contains(&venture.status))
    }
}

/// Repository interface for Venture persistence
#[async_trait]
pub trait VentureRepository: Send + Sync {
    /// Insert a new venture
    async fn insert(&self, venture: &Venture) -> Result<()>;

    /// Find venture by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Venture>>;

    /// Update all mutable venture fields
    async fn update(&self, venture: &Venture) -> Result<()>;

    /// Ventures matching the filter, newest first
    async fn list(&self, filter: &VentureFilter) -> Result<Vec<Venture>>;

    /// Most recent venture of an entrepreneur
    async fn find_latest_for_entrepreneur(&self, entrepreneur_id: &str) -> Result<Option<Venture>>;

    /// Venture count per status
    async fn count_by_status(&self) -> Result<Vec<(VentureStatus, i64)>>;
}
