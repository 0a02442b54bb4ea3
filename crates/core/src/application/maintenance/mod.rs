// Maintenance Service
// Scheduled backend housekeeping: expired auth sessions, their wizard drafts and VACUUM

use super::{Ports, SessionContext};
use crate::domain::{Profile, Role};
use crate::error::Result;
use crate::port::{DraftStore, Maintenance, MaintenanceConfig, MaintenanceStats, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

/// Maintenance scheduler
///
/// Runs periodic maintenance operations (session purge, draft purge, VACUUM) in the background
#[derive(Clone)]
pub struct MaintenanceScheduler {
    maintenance: Arc<dyn Maintenance>,
    config: MaintenanceConfig,
    interval_hours: u64,
    drafts: Option<(Arc<dyn DraftStore>, Arc<dyn TimeProvider>)>,
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    ///
    /// # Arguments
    /// * `maintenance` - Maintenance implementation
    /// * `config` - Maintenance configuration
    /// * `interval_hours` - How often to run maintenance (hours)
    pub fn new(
        maintenance: Arc<dyn Maintenance>,
        config: MaintenanceConfig,
        interval_hours: u64,
    ) -> Self {
        Self {
            maintenance,
            config,
            interval_hours,
            drafts: None,
        }
    }

    /// Also drop wizard drafts staged by sessions that have expired
    pub fn with_draft_store(mut self, drafts: Arc<dyn DraftStore>, clock: Arc<dyn TimeProvider>) -> Self {
        self.drafts = Some((drafts, clock));
        self
    }

    async fn run_once(&self) -> Result<MaintenanceStats> {
        let stats = self.maintenance.run_full_maintenance(&self.config).await?;

        if let Some((drafts, clock)) = &self.drafts {
            let purged = drafts.purge_expired(clock.now_millis()).await?;
            info!(purged_drafts = purged, "Expired draft purge completed");
        }

        Ok(stats)
    }

    /// Run maintenance loop (background task)
    ///
    /// Should be spawned in tokio::spawn
    pub async fn run(self) {
        info!(
            interval_hours = self.interval_hours,
            max_db_size_mb = self.config.max_db_size_mb,
            "Maintenance scheduler started"
        );

        let mut tick = interval(Duration::from_secs(self.interval_hours.max(1) * 3600));

        loop {
            tick.tick().await;

            info!("Running scheduled maintenance...");

            match self.run_once().await {
                Ok(stats) => {
                    info!(
                        db_size_mb = stats.db_size_mb,
                        ventures = stats.venture_count,
                        live_sessions = stats.live_session_count,
                        "Scheduled maintenance completed successfully"
                    );
                }
                Err(e) => {
                    error!(error = ?e, "Scheduled maintenance failed");
                }
            }
        }
    }

    /// Run maintenance immediately (for manual trigger)
    pub async fn run_now(&self) -> Result<MaintenanceStats> {
        info!("Running manual maintenance...");

        let stats = self.run_once().await?;

        info!(
            db_size_mb = stats.db_size_mb,
            profiles = stats.profile_count,
            "Manual maintenance completed"
        );

        Ok(stats)
    }
}

/// Manual maintenance trigger, super_admin only
pub async fn run_maintenance(scheduler: &MaintenanceScheduler, ctx: &SessionContext) -> Result<MaintenanceStats> {
    ctx.require_role(&[Role::SuperAdmin], "run maintenance")?;
    scheduler.run_now().await
}

/// Every profile, super_admin only
pub async fn list_profiles(ports: &Ports, ctx: &SessionContext) -> Result<Vec<Profile>> {
    ctx.require_role(&[Role::SuperAdmin], "list users")?;
    ports.profiles.list_all().await
}
