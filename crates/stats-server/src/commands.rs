use crate::config::Config;
use crate::server::{self, AppState};
use anyhow::{Context, Result};
use colored::Colorize;
use stats_cache::CacheConfig;
use stats_core::{CacheStatus, QueryParams};
use stats_engine::CachedStatsEngine;
use stats_storage::{CsvDataSource, Dataset};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Load the readings CSV once; the result is never modified afterwards
pub fn load_dataset(path: &Path) -> Result<Arc<Dataset>> {
    let source = CsvDataSource::from_path(path)
        .with_context(|| format!("opening dataset {}", path.display()))?;
    let dataset =
        Dataset::load(&source).with_context(|| format!("loading dataset {}", path.display()))?;
    Ok(Arc::new(dataset))
}

pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.listen_addr))?;

    let data_path = config.data_path.clone();
    let dataset = tokio::task::spawn_blocking(move || load_dataset(&data_path))
        .await
        .context("dataset loading task failed")??;
    info!(
        max_entries = config.cache.max_entries,
        enabled = config.cache.enabled,
        track_seen_keys = config.cache.track_seen_keys,
        "Query cache configured"
    );

    let state = Arc::new(AppState {
        engine: CachedStatsEngine::new(dataset, config.cache),
    });
    server::serve(addr, state).await
}

/// Run a query against a dataset file, `repeat` times, printing each outcome
pub fn run_query(
    data_path: &Path,
    params: &QueryParams,
    repeat: usize,
    cache: CacheConfig,
) -> Result<()> {
    let dataset = load_dataset(data_path)?;
    let engine = CachedStatsEngine::new(dataset, cache);

    for _ in 0..repeat.max(1) {
        let start = Instant::now();
        let (stats, status) = engine.query(params)?;
        let elapsed = start.elapsed();

        let label = match status {
            CacheStatus::Hit => status.as_str().bright_green(),
            CacheStatus::Miss => status.as_str().bright_yellow(),
        };
        println!(
            "{} {} {}",
            label,
            serde_json::to_string(&serde_json::json!({ "stats": stats }))?,
            format!("({:.3}ms)", elapsed.as_secs_f64() * 1000.0).bright_black()
        );
    }

    Ok(())
}
