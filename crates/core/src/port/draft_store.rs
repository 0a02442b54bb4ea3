// Draft Store Port - ephemeral staging for the application wizard

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Per-session scratch storage keyed by wizard step name.
///
/// Contents are a convenience cache, never durable state. Every session key
/// carries the expiry of the session that staged it.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Stage (or overwrite) the data of one step
    async fn put(&self, session_key: &str, expires_at: i64, step: &str, data: serde_json::Value) -> Result<()>;

    /// Staged data of one step
    async fn get(&self, session_key: &str, step: &str) -> Result<Option<serde_json::Value>>;

    /// Drop everything staged for a session
    async fn clear(&self, session_key: &str) -> Result<()>;

    /// Drop drafts of sessions expired at `now_millis`
    ///
    /// # Returns
    /// Number of sessions whose drafts were dropped
    async fn purge_expired(&self, now_millis: i64) -> Result<usize>;
}

#[derive(Default)]
struct SessionDrafts {
    expires_at: i64,
    steps: HashMap<String, serde_json::Value>,
}

/// Process-local draft store
#[derive(Default)]
pub struct InMemoryDraftStore {
    drafts: RwLock<HashMap<String, SessionDrafts>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn put(&self, session_key: &str, expires_at: i64, step: &str, data: serde_json::Value) -> Result<()> {
        let mut drafts = self.drafts.write().await;
        let entry = drafts.entry(session_key.to_string()).or_default();
        entry.expires_at = expires_at;
        entry.steps.insert(step.to_string(), data);
        Ok(())
    }

    async fn get(&self, session_key: &str, step: &str) -> Result<Option<serde_json::Value>> {
        Ok(self
            .drafts
            .read()
            .await
            .get(session_key)
            .and_then(|session| session.steps.get(step))
            .cloned())
    }

    async fn clear(&self, session_key: &str) -> Result<()> {
        self.drafts.write().await.remove(session_key);
        Ok(())
    }

    async fn purge_expired(&self, now_millis: i64) -> Result<usize> {
        let mut drafts = self.drafts.write().await;
        let before = drafts.len();
        drafts.retain(|_, session| session.expires_at > now_millis);
        Ok(before - drafts.len())
    }
}
