// Print stored batches for the last N hours as JSON (hosts hashed, as served by GET /lag),
// plus a destination-hop summary per batch on stderr.
//
// Usage: cargo run --example dump_range -- [DB_PATH] [HOURS] [BUCKET_MINUTES]
//   DB_PATH         default: ./data/lag.db
//   HOURS           default: 1
//   BUCKET_MINUTES  optional; when given, prints the downsampled series instead

use lagserver::downsample::{self, BucketWidth};
use lagserver::lag_repo::LagRepo;
use lagserver::models::LagResultDto;
use lagserver::time::{MS_PER_HOUR, now_millis};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).map(String::as_str).unwrap_or("./data/lag.db");
    let hours: i64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1);
    let bucket_minutes: Option<u32> = args.get(3).and_then(|s| s.parse().ok());

    let repo = LagRepo::connect(path, 1, None).await?;
    let to_ts = now_millis();
    let from_ts = to_ts - hours * MS_PER_HOUR;

    match bucket_minutes {
        Some(minutes) => {
            let buckets =
                downsample::downsample(&repo, from_ts, to_ts, BucketWidth::Fixed { minutes })
                    .await?;
            println!("{}", serde_json::to_string_pretty(&buckets)?);
        }
        None => {
            let batches = repo.find_batches_in_range(from_ts, to_ts).await?;
            let dtos: Vec<LagResultDto> = batches.iter().map(LagResultDto::from).collect();
            println!("{}", serde_json::to_string_pretty(&dtos)?);
            // One line per batch on stderr: destination latency, the usual headline number.
            for b in &batches {
                if let Some(dest) = b.destination_hop() {
                    eprintln!(
                        "{} {} avg={:.1}ms lost={}/{}",
                        b.created_at.to_rfc3339(),
                        b.destination_name,
                        dest.average_ms,
                        dest.lost,
                        dest.sent
                    );
                }
            }
        }
    }
    Ok(())
}
