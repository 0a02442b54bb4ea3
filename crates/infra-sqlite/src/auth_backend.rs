// SQLite AuthBackend Implementation
//
// Email/password accounts with argon2id hashes and opaque session tokens.

use crate::error::{corrupt_column, map_sqlx_error};
use accelerate_core::error::{AppError, Result};
use accelerate_core::port::{AuthBackend, AuthSession, AuthUser, SignUpMetadata, TimeProvider};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

pub struct SqliteAuthBackend {
    pool: SqlitePool,
    clock: Arc<dyn TimeProvider>,
    session_ttl_millis: i64,
}

impl SqliteAuthBackend {
    pub fn new(pool: SqlitePool, clock: Arc<dyn TimeProvider>, session_ttl_hours: i64) -> Self {
        Self {
            pool,
            clock,
            session_ttl_millis: session_ttl_hours.max(1) * MILLIS_PER_HOUR,
        }
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Database(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

#[async_trait]
impl AuthBackend for SqliteAuthBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthUser> {
        let id = uuid::Uuid::new_v4().to_string();
        let password_hash = hash_password(password)?;

        sqlx::query(
            "INSERT INTO auth_users (id, email, password_hash, metadata, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(serde_json::to_string(metadata)?)
        .bind(self.clock.now_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            AppError::Conflict(_) => AppError::Conflict(format!("Email {} is already registered", email)),
            other => other,
        })?;

        info!(user_id = %id, role = %metadata.role, "User registered");

        Ok(AuthUser {
            id,
            email: email.to_string(),
            metadata: Some(metadata.clone()),
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, metadata FROM auth_users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &row.password_hash)? {
            debug!(user_id = %row.id, "Password mismatch");
            return Err(invalid_credentials());
        }

        let token = uuid::Uuid::new_v4().to_string();
        let now = self.clock.now_millis();
        let expires_at = now + self.session_ttl_millis;

        sqlx::query("INSERT INTO auth_sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
            .bind(&token)
            .bind(&row.id)
            .bind(expires_at)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(AuthSession {
            token,
            user: row.into_user()?,
            expires_at,
        })
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<AuthSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT s.token, s.expires_at, u.id, u.email, u.password_hash, u.metadata
            FROM auth_sessions s
            JOIN auth_users u ON u.id = s.user_id
            WHERE s.token = ? AND s.expires_at > ?
            "#,
        )
        .bind(token)
        .bind(self.clock.now_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|r| {
            Ok(AuthSession {
                token: r.token,
                expires_at: r.expires_at,
                user: r.user.into_user()?,
            })
        })
        .transpose()
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    metadata: Option<String>, // JSON
}

impl UserRow {
    fn into_user(self) -> Result<AuthUser> {
        let metadata = self
            .metadata
            .map(|m| serde_json::from_str(&m))
            .transpose()
            .map_err(|e| corrupt_column("auth_users", "metadata", e))?;

        Ok(AuthUser {
            id: self.id,
            email: self.email,
            metadata,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    expires_at: i64,
    #[sqlx(flatten)]
    user: UserRow,
}
