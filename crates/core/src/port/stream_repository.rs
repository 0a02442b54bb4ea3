// Stream Repository Port (Interface)

use crate::domain::{StreamDeliverable, VentureStream};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for streams and their deliverables
#[async_trait]
pub trait StreamRepository: Send + Sync {
    /// Insert streams (one batch per application submission)
    async fn insert_many(&self, streams: &[VentureStream]) -> Result<()>;

    /// Find stream by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<VentureStream>>;

    /// Streams of a venture ordered by stream number
    async fn list_for_venture(&self, venture_id: &str) -> Result<Vec<VentureStream>>;

    /// Update all mutable stream fields
    async fn update(&self, stream: &VentureStream) -> Result<()>;

    /// Insert deliverables
    async fn insert_deliverables(&self, deliverables: &[StreamDeliverable]) -> Result<()>;

    /// Deliverables of a stream ordered by sequence number
    async fn list_deliverables(&self, stream_id: &str) -> Result<Vec<StreamDeliverable>>;

    /// Find deliverable by ID
    async fn find_deliverable(&self, id: &str) -> Result<Option<StreamDeliverable>>;

    /// Update status, current marker and detail fields of a deliverable
    async fn update_deliverable(&self, deliverable: &StreamDeliverable) -> Result<()>;
}
