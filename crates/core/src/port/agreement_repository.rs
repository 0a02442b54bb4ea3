// Agreement Repository Port (Interface)

use crate::domain::Agreement;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AgreementRepository: Send + Sync {
    /// Insert a new agreement
    async fn insert(&self, agreement: &Agreement) -> Result<()>;

    /// Find agreement by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Agreement>>;

    /// Most recent agreement of a venture
    async fn find_latest_for_venture(&self, venture_id: &str) -> Result<Option<Agreement>>;

    /// Persist status and acceptance timestamp
    async fn update(&self, agreement: &Agreement) -> Result<()>;
}
