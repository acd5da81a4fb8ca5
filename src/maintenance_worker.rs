// Opt-in retention. Runs only when database.retention_days is set: drops batches past the
// window every prune_interval_secs and VACUUMs on its own cadence to give the space back.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::Instant;

use crate::config::MaintenanceConfig;
use crate::lag_repo::LagRepo;
use tracing::{info, instrument, warn};

/// When the next VACUUM is due.
#[derive(Debug, Clone)]
pub enum VacuumCadence {
    /// Cron expression evaluated in local time.
    Cron(Box<cron::Schedule>),
    Every(Duration),
}

impl VacuumCadence {
    /// Cron when `vacuum_schedule` parses, otherwise every `vacuum_interval_secs`.
    pub fn from_config(config: &MaintenanceConfig) -> Self {
        if let Some(ref expr) = config.vacuum_schedule {
            match cron::Schedule::from_str(expr) {
                Ok(schedule) => return Self::Cron(Box::new(schedule)),
                Err(e) => {
                    warn!(cron = %expr, error = %e, "invalid vacuum_schedule; using interval")
                }
            }
        }
        Self::Every(Duration::from_secs(config.vacuum_interval_secs.max(1)))
    }

    pub fn delay_after(&self, now: DateTime<Local>) -> Duration {
        match self {
            Self::Every(interval) => *interval,
            Self::Cron(schedule) => schedule
                .after(&now)
                .next()
                .and_then(|next| (next - now).to_std().ok())
                .unwrap_or(Duration::from_secs(3600)),
        }
    }
}

/// Spawns the worker. It stops when `shutdown_rx` fires or its sender is dropped.
pub fn spawn(
    repo: Arc<LagRepo>,
    config: MaintenanceConfig,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(repo, config, shutdown_rx).await;
    })
}

#[instrument(skip(repo, shutdown_rx), fields(prune_interval_secs = config.prune_interval_secs))]
async fn run(
    repo: Arc<LagRepo>,
    config: MaintenanceConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) {
    let mut prune_interval = tokio::time::interval(Duration::from_secs(config.prune_interval_secs));
    prune_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let cadence = VacuumCadence::from_config(&config);
    let mut next_vacuum = Instant::now() + cadence.delay_after(Local::now());

    loop {
        tokio::select! {
            _ = prune_interval.tick() => {
                if let Err(e) = run_one_tick(&repo).await {
                    warn!(error = %e, "retention prune failed");
                }
            }
            _ = tokio::time::sleep_until(next_vacuum) => {
                match repo.vacuum().await {
                    Ok(()) => info!("vacuum complete"),
                    Err(e) => warn!(error = %e, "vacuum failed"),
                }
                next_vacuum = Instant::now() + cadence.delay_after(Local::now());
            }
            _ = &mut shutdown_rx => {
                break;
            }
        }
    }
    tracing::debug!("maintenance worker shutting down");
}

/// One retention pass. Returns the number of batches deleted (0 when retention is off).
pub async fn run_one_tick(repo: &LagRepo) -> anyhow::Result<u64> {
    let pruned = repo.prune_old_data().await?;
    if pruned > 0 {
        info!(pruned_batches = pruned, "retention prune");
    }
    Ok(pruned)
}
