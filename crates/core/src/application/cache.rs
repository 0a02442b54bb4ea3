// Per-user query cache with topic-scoped invalidation
//
// Reads are cached under (topic, scope). Each mutation names the topics it
// makes stale; an unscoped key drops every scope of its topic.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTopic {
    ApprovalChain,
    Venture,
    Ventures,
    MyVenture,
    Agreement,
    Review,
    VentureStreams,
    MentorRequests,
    Sessions,
    Engagement,
    Dashboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub topic: CacheTopic,
    pub scope: Option<String>,
}

impl CacheKey {
    pub fn topic(topic: CacheTopic) -> Self {
        Self { topic, scope: None }
    }

    pub fn scoped(topic: CacheTopic, scope: impl Into<String>) -> Self {
        Self {
            topic,
            scope: Some(scope.into()),
        }
    }

    /// Whether invalidating `self` makes `other` stale
    fn covers(&self, other: &CacheKey) -> bool {
        self.topic == other.topic && (self.scope.is_none() || self.scope == other.scope)
    }
}

/// Writes that make cached reads stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SubmitApplication,
    Triage { venture_id: String },
    DecideApproval { venture_id: String },
    RespondAgreement { agreement_id: String, venture_id: String },
    UpdateStream { venture_id: String },
    UpdateDeliverable,
    CompleteVenture { venture_id: String },
    RecordSession { venture_id: String },
    RespondMentorRequest,
    LogEngagement { venture_id: String },
}

impl Mutation {
    pub fn invalidates(&self) -> Vec<CacheKey> {
        use CacheTopic::*;
        match self {
            Mutation::SubmitApplication => vec![
                CacheKey::topic(Ventures),
                CacheKey::topic(MyVenture),
                CacheKey::topic(Dashboard),
            ],
            Mutation::Triage { venture_id } => vec![
                CacheKey::scoped(Review, venture_id),
                CacheKey::scoped(Venture, venture_id),
                CacheKey::topic(Ventures),
                CacheKey::topic(ApprovalChain),
                CacheKey::topic(Dashboard),
            ],
            Mutation::DecideApproval { venture_id } => vec![
                CacheKey::scoped(ApprovalChain, venture_id),
                CacheKey::scoped(Venture, venture_id),
                CacheKey::topic(Ventures),
                CacheKey::topic(Agreement),
                CacheKey::topic(Dashboard),
            ],
            Mutation::RespondAgreement {
                agreement_id,
                venture_id,
            } => vec![
                CacheKey::scoped(Agreement, agreement_id),
                CacheKey::scoped(Agreement, venture_id),
                CacheKey::scoped(Venture, venture_id),
                CacheKey::topic(Ventures),
                CacheKey::topic(MyVenture),
                CacheKey::scoped(VentureStreams, venture_id),
                CacheKey::topic(Dashboard),
            ],
            Mutation::UpdateStream { venture_id } => vec![
                CacheKey::scoped(VentureStreams, venture_id),
                CacheKey::scoped(Venture, venture_id),
                CacheKey::topic(Dashboard),
            ],
            Mutation::UpdateDeliverable => vec![CacheKey::topic(VentureStreams)],
            Mutation::CompleteVenture { venture_id } => vec![
                CacheKey::scoped(Venture, venture_id),
                CacheKey::topic(Ventures),
                CacheKey::topic(MyVenture),
                CacheKey::topic(Dashboard),
            ],
            Mutation::RecordSession { venture_id } => vec![CacheKey::scoped(Sessions, venture_id)],
            Mutation::RespondMentorRequest => {
                vec![CacheKey::topic(MentorRequests), CacheKey::topic(Dashboard)]
            }
            Mutation::LogEngagement { venture_id } => vec![CacheKey::scoped(Engagement, venture_id)],
        }
    }
}

/// Cache of read results owned by one signed-in client
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn put(&self, key: CacheKey, value: Value) {
        self.entries.write().await.insert(key, value);
    }

    pub async fn invalidate(&self, key: &CacheKey) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|cached, _| !key.covers(cached));
        before - entries.len()
    }

    /// Drop everything the mutation made stale. Returns the number of evicted entries.
    pub async fn apply(&self, mutation: &Mutation) -> usize {
        let mut evicted = 0;
        for key in mutation.invalidates() {
            evicted += self.invalidate(&key).await;
        }
        debug!(?mutation, evicted, "Query cache invalidated");
        evicted
    }

    /// Sign-out drops the whole cache
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unscoped_invalidation_drops_every_scope() {
        let cache = QueryCache::new();
        cache.put(CacheKey::scoped(CacheTopic::Agreement, "v-1"), json!(1)).await;
        cache.put(CacheKey::scoped(CacheTopic::Agreement, "v-2"), json!(2)).await;
        cache.put(CacheKey::topic(CacheTopic::Ventures), json!([])).await;

        let evicted = cache.invalidate(&CacheKey::topic(CacheTopic::Agreement)).await;
        assert_eq!(evicted, 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_decision_invalidates_chain_venture_list_and_agreements() {
        let cache = QueryCache::new();
        cache.put(CacheKey::scoped(CacheTopic::ApprovalChain, "v-1"), json!([])).await;
        cache.put(CacheKey::scoped(CacheTopic::ApprovalChain, "v-2"), json!([])).await;
        cache.put(CacheKey::scoped(CacheTopic::Venture, "v-1"), json!({})).await;
        cache.put(CacheKey::topic(CacheTopic::Ventures), json!([])).await;
        cache.put(CacheKey::scoped(CacheTopic::Agreement, "v-9"), json!({})).await;

        let evicted = cache
            .apply(&Mutation::DecideApproval {
                venture_id: "v-1".to_string(),
            })
            .await;

        assert_eq!(evicted, 4);
        assert!(cache
            .get(&CacheKey::scoped(CacheTopic::ApprovalChain, "v-2"))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_deliverable_update_drops_all_stream_lists() {
        let cache = QueryCache::new();
        cache.put(CacheKey::scoped(CacheTopic::VentureStreams, "v-1"), json!([])).await;
        cache.put(CacheKey::scoped(CacheTopic::VentureStreams, "v-2"), json!([])).await;

        cache.apply(&Mutation::UpdateDeliverable).await;
        assert!(cache.is_empty().await);
    }
}
