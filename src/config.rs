use serde::Deserialize;
use std::str::FromStr;

use crate::downsample::DEFAULT_MAX_BUCKETS;
use crate::uptime::DEFAULT_UPTIME_BUCKET_SECONDS;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub lag: LagConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    #[serde(default)]
    pub dataloader: DataloaderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// Delete batches older than this many days. Unset keeps everything.
    #[serde(default)]
    pub retention_days: Option<u32>,
}

/// Query limits for the lag endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct LagConfig {
    /// GET /lag rejects spans longer than this.
    #[serde(default = "default_max_raw_range_hours")]
    pub max_raw_range_hours: u32,
    /// Upper bound on downsampled series length.
    #[serde(default = "default_max_buckets")]
    pub max_buckets: u32,
    #[serde(default = "default_uptime_bucket_seconds")]
    pub uptime_bucket_seconds: u32,
    #[serde(default = "default_uptime_threshold_ms")]
    pub default_uptime_threshold_ms: f64,
}

fn default_max_raw_range_hours() -> u32 {
    24
}

fn default_max_buckets() -> u32 {
    DEFAULT_MAX_BUCKETS
}

fn default_uptime_bucket_seconds() -> u32 {
    DEFAULT_UPTIME_BUCKET_SECONDS
}

fn default_uptime_threshold_ms() -> f64 {
    100.0
}

impl Default for LagConfig {
    fn default() -> Self {
        Self {
            max_raw_range_hours: default_max_raw_range_hours(),
            max_buckets: default_max_buckets(),
            uptime_bucket_seconds: default_uptime_bucket_seconds(),
            default_uptime_threshold_ms: default_uptime_threshold_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceConfig {
    /// How often to delete batches older than database.retention_days (when set).
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
    /// Optional cron expression for VACUUM (e.g. "0 0 3 * * *"). Uses local time.
    #[serde(default)]
    pub vacuum_schedule: Option<String>,
    /// Run VACUUM every N seconds when vacuum_schedule is not set. Only while retention is on.
    #[serde(default = "default_vacuum_interval_secs")]
    pub vacuum_interval_secs: u64,
}

fn default_prune_interval_secs() -> u64 {
    3600
}

fn default_vacuum_interval_secs() -> u64 {
    86_400
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            prune_interval_secs: default_prune_interval_secs(),
            vacuum_schedule: None,
            vacuum_interval_secs: default_vacuum_interval_secs(),
        }
    }
}

/// Ingestion endpoint. Without a secret every PUT is refused.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataloaderConfig {
    #[serde(default)]
    pub api_secret: Option<String>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        let mut config = Self::load_from_str(&s)?;
        if let Ok(secret) = std::env::var("API_SECRET")
            && !secret.is_empty()
        {
            config.dataloader.api_secret = Some(secret);
        }
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        if let Some(days) = self.database.retention_days {
            anyhow::ensure!(
                days > 0,
                "database.retention_days must be > 0 when set, got {}",
                days
            );
        }
        anyhow::ensure!(
            self.lag.max_raw_range_hours > 0,
            "lag.max_raw_range_hours must be > 0, got {}",
            self.lag.max_raw_range_hours
        );
        anyhow::ensure!(
            self.lag.max_buckets > 0,
            "lag.max_buckets must be > 0, got {}",
            self.lag.max_buckets
        );
        anyhow::ensure!(
            self.lag.uptime_bucket_seconds > 0,
            "lag.uptime_bucket_seconds must be > 0, got {}",
            self.lag.uptime_bucket_seconds
        );
        anyhow::ensure!(
            self.lag.default_uptime_threshold_ms.is_finite()
                && self.lag.default_uptime_threshold_ms >= 0.0,
            "lag.default_uptime_threshold_ms must be >= 0, got {}",
            self.lag.default_uptime_threshold_ms
        );
        anyhow::ensure!(
            self.maintenance.prune_interval_secs > 0,
            "maintenance.prune_interval_secs must be > 0, got {}",
            self.maintenance.prune_interval_secs
        );
        anyhow::ensure!(
            self.maintenance.vacuum_interval_secs > 0,
            "maintenance.vacuum_interval_secs must be > 0, got {}",
            self.maintenance.vacuum_interval_secs
        );
        if let Some(ref schedule) = self.maintenance.vacuum_schedule {
            anyhow::ensure!(
                cron::Schedule::from_str(schedule).is_ok(),
                "maintenance.vacuum_schedule is not a valid cron expression: {:?}",
                schedule
            );
        }
        Ok(())
    }
}
