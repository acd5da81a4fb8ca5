// Wire shape for GET /lag. Hosts leave the service only as SHA-256 hex digests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Batch, HopResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LagResultDto {
    pub batch_id: String,
    pub created_at: DateTime<Utc>,
    pub test_count: u32,
    pub packet_size: u32,
    pub results: Vec<LagHubResultDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LagHubResultDto {
    pub hub_index: u32,
    pub host_hash: String,
    pub sent: u32,
    pub lost: u32,
    pub average_ms: f64,
    pub best_ms: f64,
    pub worst_ms: f64,
    pub standard_deviation_ms: f64,
}

/// Lowercase hex SHA-256 of the hop host.
pub fn hash_host(host: &str) -> String {
    format!("{:x}", Sha256::digest(host.as_bytes()))
}

impl From<&HopResult> for LagHubResultDto {
    fn from(h: &HopResult) -> Self {
        Self {
            hub_index: h.hub_index,
            host_hash: hash_host(&h.host),
            sent: h.sent,
            lost: h.lost,
            average_ms: h.average_ms,
            best_ms: h.best_ms,
            worst_ms: h.worst_ms,
            standard_deviation_ms: h.standard_deviation_ms,
        }
    }
}

impl From<&Batch> for LagResultDto {
    fn from(b: &Batch) -> Self {
        Self {
            batch_id: b.id.clone(),
            created_at: b.created_at,
            test_count: b.test_count,
            packet_size: b.packet_size,
            results: b.results.iter().map(LagHubResultDto::from).collect(),
        }
    }
}
