// Profile Repository Port (Interface)

use crate::domain::{Profile, Role};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Profile persistence
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert a profile, replacing any existing row with the same id
    async fn upsert(&self, profile: &Profile) -> Result<()>;

    /// Find profile by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>>;

    /// First profile (oldest) holding a role
    async fn find_first_by_role(&self, role: Role) -> Result<Option<Profile>>;

    /// All profiles, newest first
    async fn list_all(&self) -> Result<Vec<Profile>>;

    /// Profile count per role
    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>>;
}
