// Stored probe runs: one batch per mtr invocation, one hop result per path hop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One probe run as read back from the store. Owns its hop results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub source_name: String,
    pub destination_name: String,
    pub test_count: u32,
    pub packet_size: u32,
    /// Ordered by hub_index.
    pub results: Vec<HopResult>,
}

impl Batch {
    /// Hop with the highest hub_index (the destination), if any.
    pub fn destination_hop(&self) -> Option<&HopResult> {
        self.results.iter().max_by_key(|h| h.hub_index)
    }
}

/// Per-hop statistics inside one batch. `host` is sensitive; see [`crate::models::LagResultDto`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HopResult {
    pub hub_index: u32,
    pub host: String,
    pub sent: u32,
    pub lost: u32,
    pub average_ms: f64,
    pub best_ms: f64,
    pub worst_ms: f64,
    pub standard_deviation_ms: f64,
}

/// A batch to be written together with its hops in one transaction.
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub created_at: DateTime<Utc>,
    pub source_name: String,
    pub destination_name: String,
    pub test_count: u32,
    pub packet_size: u32,
    pub hops: Vec<NewHopResult>,
}

#[derive(Debug, Clone)]
pub struct NewHopResult {
    pub hub_index: u32,
    pub host: String,
    pub sent: u32,
    pub lost: u32,
    pub average_ms: f64,
    pub best_ms: f64,
    pub worst_ms: f64,
    pub standard_deviation_ms: f64,
}
