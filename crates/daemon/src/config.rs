//! Daemon configuration, read from `ACCELERATE_*` environment variables

use accelerate_api_rpc::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use anyhow::{Context, Result};

const DEFAULT_DB_PATH: &str = "~/.accelerate/accelerate.db";
const DEFAULT_SESSION_TTL_HOURS: i64 = 168;
const DEFAULT_MAINTENANCE_HOURS: u64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub session_ttl_hours: i64,
    pub maintenance_hours: u64,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("ACCELERATE_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        Ok(Self {
            db_path: shellexpand::tilde(&db_path).into_owned(),
            rpc_host: lookup("ACCELERATE_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port: parse_or(&lookup, "ACCELERATE_RPC_PORT", DEFAULT_RPC_PORT)?,
            session_ttl_hours: parse_or(
                &lookup,
                "ACCELERATE_SESSION_TTL_HOURS",
                DEFAULT_SESSION_TTL_HOURS,
            )?,
            maintenance_hours: parse_or(
                &lookup,
                "ACCELERATE_MAINTENANCE_HOURS",
                DEFAULT_MAINTENANCE_HOURS,
            )?,
            log_format: match lookup("ACCELERATE_LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
