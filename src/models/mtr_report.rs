// Ingestion body: the JSON report printed by `mtr -j`.
// Loss is reported as a percentage; it is converted to an absolute count here so the
// store (and everything reading it) only sees counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::{NewBatch, NewHopResult};
use crate::downsample::stats::finite_or_zero;

#[derive(Debug, Clone, Deserialize)]
pub struct MtrReportDto {
    pub report: MtrReport,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MtrReport {
    pub mtr: MtrInfo,
    #[serde(default)]
    pub hubs: Vec<MtrHub>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MtrInfo {
    pub src: String,
    pub dst: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub tests: u32,
    /// mtr prints this one as a string ("64").
    #[serde(deserialize_with = "lenient_u32")]
    pub psize: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MtrHub {
    pub host: String,
    #[serde(rename = "Loss%")]
    pub loss_percent: f64,
    #[serde(rename = "Snt", deserialize_with = "lenient_u32")]
    pub sent: u32,
    #[serde(rename = "Avg")]
    pub avg: f64,
    #[serde(rename = "Best")]
    pub best: f64,
    #[serde(rename = "Wrst")]
    pub worst: f64,
    #[serde(rename = "StDev")]
    pub stdev: f64,
}

impl MtrHub {
    /// round(loss% / 100 * sent), kept within 0..=sent.
    pub fn lost_count(&self) -> u32 {
        if !self.loss_percent.is_finite() {
            return 0;
        }
        let lost = (self.loss_percent / 100.0 * self.sent as f64).round();
        lost.clamp(0.0, self.sent as f64) as u32
    }
}

impl MtrReportDto {
    /// Hub position in the report becomes hub_index.
    pub fn into_new_batch(self, created_at: DateTime<Utc>) -> NewBatch {
        let MtrReport { mtr, hubs } = self.report;
        let hops = hubs
            .iter()
            .enumerate()
            .map(|(idx, hub)| NewHopResult {
                hub_index: idx as u32,
                host: hub.host.clone(),
                sent: hub.sent,
                lost: hub.lost_count(),
                average_ms: finite_or_zero(hub.avg),
                best_ms: finite_or_zero(hub.best),
                worst_ms: finite_or_zero(hub.worst),
                standard_deviation_ms: finite_or_zero(hub.stdev),
            })
            .collect();
        NewBatch {
            created_at,
            source_name: mtr.src,
            destination_name: mtr.dst,
            test_count: mtr.tests,
            packet_size: mtr.psize,
            hops,
        }
    }
}

/// Accepts a JSON number or a numeric string.
fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }
    match Raw::deserialize(d)? {
        Raw::Num(n) if n.is_finite() && n >= 0.0 && n <= u32::MAX as f64 => Ok(n.round() as u32),
        Raw::Num(n) => Err(serde::de::Error::custom(format!(
            "expected non-negative count, got {n}"
        ))),
        Raw::Str(s) => s.trim().parse::<u32>().map_err(serde::de::Error::custom),
    }
}
