use anyhow::Result;
use lagserver::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    if app_config.dataloader.api_secret.is_none() {
        tracing::warn!(
            "no dataloader.api_secret configured; PUT /dataloader/mtr-result will refuse all requests"
        );
    }

    let lag_repo = Arc::new(
        lag_repo::LagRepo::connect(
            &app_config.database.path,
            app_config.database.max_pool_size,
            app_config.database.retention_days,
        )
        .await?,
    );
    lag_repo.init().await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let maintenance_handle = if lag_repo.retention_enabled() {
        // Catch up on retention before serving; the worker keeps it current afterwards.
        if let Err(e) = maintenance_worker::run_one_tick(&lag_repo).await {
            tracing::warn!(error = %e, "startup retention prune failed");
        }
        Some(maintenance_worker::spawn(
            lag_repo.clone(),
            app_config.maintenance.clone(),
            shutdown_rx,
        ))
    } else {
        tracing::info!("database.retention_days not set; keeping all batches");
        None
    };

    let app = routes::app(lag_repo, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    let _ = tokio::signal::ctrl_c().await;
                }
            } => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                if let Some(handle) = maintenance_handle {
                    let _ = handle.await;
                }
            }
        }
    }

    Ok(())
}
