// Tables and indexes for batches and hop results. Idempotent (IF NOT EXISTS).

use sqlx::SqlitePool;

pub(super) async fn init_tables(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mtr_batch (
            id TEXT PRIMARY KEY NOT NULL,
            created_at INTEGER NOT NULL,
            source_name TEXT NOT NULL,
            destination_name TEXT NOT NULL,
            test_count INTEGER NOT NULL,
            packet_size INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_mtr_batch_created_at ON mtr_batch(created_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mtr_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id TEXT NOT NULL REFERENCES mtr_batch(id) ON DELETE CASCADE,
            hub_index INTEGER NOT NULL,
            host TEXT NOT NULL,
            sent INTEGER NOT NULL,
            lost INTEGER NOT NULL,
            average_ms REAL NOT NULL,
            best_ms REAL NOT NULL,
            worst_ms REAL NOT NULL,
            standard_deviation_ms REAL NOT NULL,
            UNIQUE (batch_id, hub_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_mtr_results_batch_id ON mtr_results(batch_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_mtr_results_hub_index_host ON mtr_results(hub_index, host)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
