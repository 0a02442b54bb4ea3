// Authentication use cases and the explicit per-caller session context

use super::Ports;
use crate::domain::{Profile, Role};
use crate::error::{AppError, Result};
use crate::port::{AuthSession, AuthUser, SignUpMetadata};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Authenticated caller: created on sign-in, torn down on sign-out and
/// re-derived from the persisted token after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub token: String,
    pub expires_at: i64,
    pub profile: Profile,
}

impl SessionContext {
    pub fn profile_id(&self) -> &str {
        &self.profile.id
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    /// Fail with Forbidden unless the caller holds one of `roles`
    pub fn require_role(&self, roles: &[Role], action: &str) -> Result<()> {
        if roles.contains(&self.profile.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "{} cannot {}",
                self.profile.role, action
            )))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if !email.contains('@') || email.trim().len() < 3 {
        return Err(AppError::Validation(format!("Invalid email address: {}", email)));
    }
    if password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

/// Register a user and create their profile
pub async fn sign_up(ports: &Ports, req: SignUpRequest) -> Result<Profile> {
    validate_credentials(&req.email, &req.password)?;
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }

    let metadata = SignUpMetadata {
        full_name: req.full_name,
        role: req.role,
        organization: req.organization,
        phone: req.phone,
    };

    let user = ports.auth.sign_up(&req.email, &req.password, &metadata).await?;
    let profile = profile_from_user(ports, &user);
    ports.profiles.upsert(&profile).await?;

    info!(profile_id = %profile.id, role = %profile.role, "User signed up");
    Ok(profile)
}

/// Exchange credentials for a session context
pub async fn sign_in(ports: &Ports, email: &str, password: &str) -> Result<SessionContext> {
    let session = ports.auth.sign_in_with_password(email, password).await?;
    let profile = fetch_or_bootstrap_profile(ports, &session.user).await?;

    info!(profile_id = %profile.id, role = %profile.role, "User signed in");
    Ok(context(session, profile))
}

/// Tear down a session
pub async fn sign_out(ports: &Ports, ctx: &SessionContext) -> Result<()> {
    ports.auth.sign_out(&ctx.token).await?;
    ports.drafts.clear(&ctx.token).await?;
    info!(profile_id = %ctx.profile_id(), "User signed out");
    Ok(())
}

/// Re-derive the context of a persisted session token
pub async fn resolve(ports: &Ports, token: &str) -> Result<SessionContext> {
    let session = ports
        .auth
        .get_session(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired or unknown".to_string()))?;
    let profile = fetch_or_bootstrap_profile(ports, &session.user).await?;
    Ok(context(session, profile))
}

fn context(session: AuthSession, profile: Profile) -> SessionContext {
    SessionContext {
        token: session.token,
        expires_at: session.expires_at,
        profile,
    }
}

/// Load the profile of an auth user, creating it from sign-up metadata
/// when the row is missing.
async fn fetch_or_bootstrap_profile(ports: &Ports, user: &AuthUser) -> Result<Profile> {
    if let Some(profile) = ports.profiles.find_by_id(&user.id).await? {
        return Ok(profile);
    }

    warn!(user_id = %user.id, "Profile missing, creating from user metadata");
    let profile = profile_from_user(ports, user);
    ports.profiles.upsert(&profile).await?;
    Ok(profile)
}

fn profile_from_user(ports: &Ports, user: &AuthUser) -> Profile {
    let now = ports.clock.now_millis();
    match &user.metadata {
        Some(meta) => {
            let mut profile =
                Profile::new(user.id.clone(), now, meta.full_name.clone(), user.email.clone(), meta.role);
            profile.organization = meta.organization.clone();
            profile.phone = meta.phone.clone();
            profile
        }
        None => Profile::new(user.id.clone(), now, "", user.email.clone(), Role::Entrepreneur),
    }
}
