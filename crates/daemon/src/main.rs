//! Accelerate Daemon - Main Entry Point
//! JSON-RPC server over the SQLite backend, plus scheduled maintenance

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use accelerate_api_rpc::{RpcServer, RpcServerConfig};
use accelerate_core::application::MaintenanceScheduler;
use accelerate_core::port::MaintenanceConfig;
use accelerate_infra_sqlite::{
    build_ports, create_pool, database_url, run_migrations, SqliteMaintenance,
};
use config::DaemonConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = DaemonConfig::from_env()?;
    telemetry::init(config.log_format)?;

    info!("Accelerate daemon v{} starting...", VERSION);

    // 2. Database
    if let Some(parent) = Path::new(&config.db_path).parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    info!(db_path = %config.db_path, "Initializing database...");

    let pool = create_pool(&database_url(&config.db_path))
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 3. Wiring
    let ports = build_ports(pool.clone(), config.session_ttl_hours);
    let maintenance = Arc::new(SqliteMaintenance::new(pool, ports.clock.clone()));
    let scheduler = MaintenanceScheduler::new(
        maintenance,
        MaintenanceConfig::default(),
        config.maintenance_hours,
    )
    .with_draft_store(ports.drafts.clone(), ports.clock.clone());

    // 4. JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, ports, scheduler.clone())
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 5. Maintenance loop
    info!(
        interval_hours = config.maintenance_hours,
        "Starting maintenance scheduler..."
    );
    let maintenance_handle = tokio::spawn(scheduler.run());

    info!(addr = %addr, "System ready. Press Ctrl+C to shutdown");

    // 6. Shutdown
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    maintenance_handle.abort();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");

    Ok(())
}
