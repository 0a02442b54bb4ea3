// Approval Chain Repository Port (Interface)

use crate::domain::ApprovalChainItem;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ApprovalChainRepository: Send + Sync {
    /// Insert the items of a chain
    async fn insert_many(&self, items: &[ApprovalChainItem]) -> Result<()>;

    /// Find chain item by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<ApprovalChainItem>>;

    /// Full chain of a venture ordered by sequence number
    async fn list_for_venture(&self, venture_id: &str) -> Result<Vec<ApprovalChainItem>>;

    /// Persist the decision fields (status, notes, decided_at) of an item
    async fn update(&self, item: &ApprovalChainItem) -> Result<()>;

    /// Pending items assigned to an approver, oldest first
    async fn list_pending_for_approver(&self, approver_id: &str) -> Result<Vec<ApprovalChainItem>>;
}
