// SQLite measurement store: mtr_batch owns mtr_results (FK with ON DELETE CASCADE).
// Timestamps are stored as Unix milliseconds.

mod schema;

use crate::models::{Batch, HopResult, NewBatch};
use crate::source::{HopRow, MeasurementSource};
use crate::time::{from_millis, now_millis, to_millis};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

pub struct LagRepo {
    pool: SqlitePool,
    retention_ms: Option<i64>,
}

impl LagRepo {
    pub async fn connect(
        path: &str,
        max_pool_size: u32,
        retention_days: Option<u32>,
    ) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size.max(1))
            .connect_with(opts)
            .await?;
        let retention_ms = retention_days.map(|days| (days as i64) * 24 * 60 * 60 * 1000);
        Ok(Self { pool, retention_ms })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        schema::init_tables(&self.pool).await
    }

    /// Writes the batch and all of its hops in one transaction. Returns the new batch id.
    #[instrument(skip(self, batch), fields(repo = "lag", operation = "insert_batch_with_hops", hops = batch.hops.len()))]
    pub async fn insert_batch_with_hops(&self, batch: &NewBatch) -> anyhow::Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO mtr_batch (id, created_at, source_name, destination_name, test_count, packet_size) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&id)
        .bind(to_millis(batch.created_at))
        .bind(&batch.source_name)
        .bind(&batch.destination_name)
        .bind(batch.test_count as i64)
        .bind(batch.packet_size as i64)
        .execute(&mut *tx)
        .await?;

        for hop in &batch.hops {
            sqlx::query(
                "INSERT INTO mtr_results (batch_id, hub_index, host, sent, lost, average_ms, best_ms, worst_ms, standard_deviation_ms) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(&id)
            .bind(hop.hub_index as i64)
            .bind(&hop.host)
            .bind(hop.sent as i64)
            .bind(hop.lost as i64)
            .bind(hop.average_ms)
            .bind(hop.best_ms)
            .bind(hop.worst_ms)
            .bind(hop.standard_deviation_ms)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(id)
    }

    /// Batches with created_at in [from_ts, to_ts], ascending, hops ordered by hub_index.
    #[instrument(skip(self), fields(repo = "lag", operation = "find_batches_in_range"))]
    pub async fn find_batches_in_range(
        &self,
        from_ts: i64,
        to_ts: i64,
    ) -> anyhow::Result<Vec<Batch>> {
        // One read transaction so batches and hops come from the same snapshot.
        let mut tx = self.pool.begin().await?;
        let batch_rows = sqlx::query(
            "SELECT id, created_at, source_name, destination_name, test_count, packet_size
             FROM mtr_batch WHERE created_at >= $1 AND created_at <= $2
             ORDER BY created_at ASC, id ASC",
        )
        .bind(from_ts)
        .bind(to_ts)
        .fetch_all(&mut *tx)
        .await?;

        let hop_rows = sqlx::query(
            "SELECT r.batch_id, r.hub_index, r.host, r.sent, r.lost,
                    r.average_ms, r.best_ms, r.worst_ms, r.standard_deviation_ms
             FROM mtr_results r JOIN mtr_batch b ON b.id = r.batch_id
             WHERE b.created_at >= $1 AND b.created_at <= $2
             ORDER BY r.batch_id ASC, r.hub_index ASC",
        )
        .bind(from_ts)
        .bind(to_ts)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut out = Vec::with_capacity(batch_rows.len());
        let mut index_by_id: HashMap<String, usize> = HashMap::with_capacity(batch_rows.len());
        for row in &batch_rows {
            let batch = Self::parse_batch_row(row)?;
            index_by_id.insert(batch.id.clone(), out.len());
            out.push(batch);
        }
        for row in &hop_rows {
            let batch_id: String = row.try_get("batch_id")?;
            if let Some(&i) = index_by_id.get(&batch_id) {
                out[i].results.push(Self::parse_hop_row(row)?);
            }
        }
        Ok(out)
    }

    /// Delete batches (and, by cascade, their hops) created before `cutoff_ts`.
    #[instrument(skip(self), fields(repo = "lag", operation = "prune_before"))]
    pub async fn prune_before(&self, cutoff_ts: i64) -> anyhow::Result<u64> {
        let r = sqlx::query("DELETE FROM mtr_batch WHERE created_at < $1")
            .bind(cutoff_ts)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }

    pub fn retention_enabled(&self) -> bool {
        self.retention_ms.is_some()
    }

    /// Prune batches older than retention_days; a no-op when retention is off.
    pub async fn prune_old_data(&self) -> anyhow::Result<u64> {
        match self.retention_ms {
            Some(retention_ms) => self.prune_before(now_millis() - retention_ms).await,
            None => Ok(0),
        }
    }

    /// Reclaim space after deletes.
    #[instrument(skip(self), fields(repo = "lag", operation = "vacuum"))]
    pub async fn vacuum(&self) -> anyhow::Result<()> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }

    /// Database file size as page_count * page_size.
    #[instrument(skip(self), fields(repo = "lag", operation = "storage_size_bytes"))]
    pub async fn storage_size_bytes(&self) -> anyhow::Result<u64> {
        let size = sqlx::query_scalar::<_, i64>(
            "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(size.max(0) as u64)
    }

    fn parse_batch_row(row: &SqliteRow) -> anyhow::Result<Batch> {
        Ok(Batch {
            id: row.try_get("id")?,
            created_at: from_millis(row.try_get("created_at")?),
            source_name: row.try_get("source_name")?,
            destination_name: row.try_get("destination_name")?,
            test_count: count_column(row, "test_count")?,
            packet_size: count_column(row, "packet_size")?,
            results: Vec::new(),
        })
    }

    fn parse_hop_row(row: &SqliteRow) -> anyhow::Result<HopResult> {
        Ok(HopResult {
            hub_index: count_column(row, "hub_index")?,
            host: row.try_get("host")?,
            sent: count_column(row, "sent")?,
            lost: count_column(row, "lost")?,
            average_ms: ms_column(row, "average_ms")?,
            best_ms: ms_column(row, "best_ms")?,
            worst_ms: ms_column(row, "worst_ms")?,
            standard_deviation_ms: ms_column(row, "standard_deviation_ms")?,
        })
    }

    fn parse_joined_row(row: &SqliteRow) -> anyhow::Result<HopRow> {
        Ok(HopRow {
            batch_id: row.try_get("batch_id")?,
            created_at: row.try_get("created_at")?,
            test_count: count_column(row, "test_count")?,
            packet_size: count_column(row, "packet_size")?,
            hub_index: count_column(row, "hub_index")?,
            sent: count_column(row, "sent")?,
            lost: count_column(row, "lost")?,
            average_ms: ms_column(row, "average_ms")?,
            best_ms: ms_column(row, "best_ms")?,
            worst_ms: ms_column(row, "worst_ms")?,
            standard_deviation_ms: ms_column(row, "standard_deviation_ms")?,
        })
    }
}

impl MeasurementSource for LagRepo {
    async fn earliest_created_at(&self) -> anyhow::Result<Option<i64>> {
        let row = sqlx::query_scalar::<_, Option<i64>>("SELECT MIN(created_at) FROM mtr_batch")
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn hop_rows_in_range(&self, from_ts: i64, to_ts: i64) -> anyhow::Result<Vec<HopRow>> {
        let rows = sqlx::query(
            "SELECT b.id AS batch_id, b.created_at, b.test_count, b.packet_size,
                    r.hub_index, r.sent, r.lost, r.average_ms, r.best_ms, r.worst_ms,
                    r.standard_deviation_ms
             FROM mtr_batch b JOIN mtr_results r ON r.batch_id = b.id
             WHERE b.created_at >= $1 AND b.created_at <= $2
             ORDER BY b.created_at ASC, r.hub_index ASC",
        )
        .bind(from_ts)
        .bind(to_ts)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(Self::parse_joined_row(row)?);
        }
        Ok(out)
    }
}

/// Integer column as u32; NULL reads as 0, out-of-range values are clamped.
fn count_column(row: &SqliteRow, name: &str) -> anyhow::Result<u32> {
    let v: Option<i64> = row.try_get(name)?;
    Ok(v.unwrap_or(0).clamp(0, u32::MAX as i64) as u32)
}

/// Latency column; NULL and non-finite values read as 0.
fn ms_column(row: &SqliteRow, name: &str) -> anyhow::Result<f64> {
    let v: Option<f64> = row.try_get(name)?;
    Ok(v.filter(|x| x.is_finite()).unwrap_or(0.0))
}
