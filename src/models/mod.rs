// Domain models: stored batches, wire DTOs and derived aggregates

mod batch;
mod downsample;
mod lag_result;
mod mtr_report;
mod uptime;

pub use batch::{Batch, HopResult, NewBatch, NewHopResult};
pub use downsample::{Bucket, HubAggregate};
pub use lag_result::{LagHubResultDto, LagResultDto, hash_host};
pub use mtr_report::{MtrHub, MtrInfo, MtrReport, MtrReportDto};
pub use uptime::UptimeReport;
