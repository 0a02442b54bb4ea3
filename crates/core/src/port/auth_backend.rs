// Authentication Backend Port (Interface)

use crate::domain::Role;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata captured at sign-up and used to build the profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub role: Role,
    pub organization: Option<String>,
    pub phone: Option<String>,
}

/// Authenticated identity as known to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub metadata: Option<SignUpMetadata>,
}

/// Live session issued by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
    pub expires_at: i64,
}

/// Session-based authentication provided by the hosted backend
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Register a new user. Fails with Conflict when the email is taken.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthUser>;

    /// Exchange credentials for a session. Fails with Unauthorized.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Invalidate a session token
    async fn sign_out(&self, token: &str) -> Result<()>;

    /// Look up a live (unexpired) session
    async fn get_session(&self, token: &str) -> Result<Option<AuthSession>>;
}
