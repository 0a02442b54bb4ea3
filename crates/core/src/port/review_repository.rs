// Application Review Repository Port (Interface)

use crate::domain::ApplicationReview;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert a review
    async fn insert(&self, review: &ApplicationReview) -> Result<()>;

    /// Latest review of a venture
    async fn find_latest_for_venture(&self, venture_id: &str) -> Result<Option<ApplicationReview>>;
}
