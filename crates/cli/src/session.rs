//! Persisted sign-in: the session token survives between invocations and is
//! re-read on every command.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SESSION_FILE: &str = "~/.accelerate/session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub expires_at: i64,
    pub profile_id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

impl StoredSession {
    /// Build from the `session` object returned by auth.signin.v1
    pub fn from_rpc(session: &serde_json::Value) -> Result<Self> {
        let profile = &session["profile"];
        let field = |v: &serde_json::Value, name: &str| -> Result<String> {
            v[name]
                .as_str()
                .map(str::to_string)
                .with_context(|| format!("Sign-in response is missing {}", name))
        };

        Ok(Self {
            token: field(session, "token")?,
            expires_at: session["expires_at"].as_i64().unwrap_or_default(),
            profile_id: field(profile, "id")?,
            email: field(profile, "email")?,
            full_name: field(profile, "full_name")?,
            role: field(profile, "role")?,
        })
    }
}

pub fn resolve_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

pub fn load(path: &Path) -> Result<Option<StoredSession>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let session = serde_json::from_str(&raw)
        .with_context(|| format!("Corrupt session file {}", path.display()))?;
    Ok(Some(session))
}

pub fn require(path: &Path) -> Result<StoredSession> {
    load(path)?.context("Not signed in. Run `accelerate auth signin` first.")
}

pub fn save(path: &Path, session: &StoredSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_string_pretty(session)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn clear(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}
