use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Share of measured buckets that stayed under the latency/loss threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeReport {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub uptime_percentage: f64,
    // Wire name matches the published API, typo included.
    #[serde(rename = "unusuablePercentage")]
    pub unusable_percentage: f64,
}
