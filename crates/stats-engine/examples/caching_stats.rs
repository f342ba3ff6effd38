//! Query Caching Example
//!
//! Demonstrates cached stats queries, LRU eviction and cache statistics.

use anyhow::Result;
use chrono::NaiveDate;
use stats_cache::CacheConfig;
use stats_core::QueryParams;
use stats_engine::CachedStatsEngine;
use stats_storage::{Dataset, MemoryDataSource, Reading};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Stats Caching Example ===\n");

    let dataset = sample_dataset()?;

    // Example 1: Miss then hit
    basic_caching(Arc::clone(&dataset))?;

    // Example 2: Eviction and seen keys
    eviction(Arc::clone(&dataset))?;

    // Example 3: Cache statistics
    cache_statistics(dataset)?;

    println!("\n=== All caching examples completed! ===");
    Ok(())
}

fn sample_dataset() -> Result<Arc<Dataset>> {
    let mut readings = Vec::new();
    for day in 1..=28 {
        let ts = NaiveDate::from_ymd_opt(2024, 2, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .ok_or_else(|| anyhow::anyhow!("invalid date"))?;
        for (location, base) in [("lab", 20.0), ("roof", 5.0)] {
            readings.push(Reading::new(location, "temperature", ts, base + day as f64 / 4.0));
            readings.push(Reading::new(location, "humidity", ts, 40.0 + day as f64));
        }
    }
    let source = MemoryDataSource::from_readings(&readings)?;
    Ok(Arc::new(Dataset::load(&source)?))
}

/// Example 1: The same parameters twice
fn basic_caching(dataset: Arc<Dataset>) -> Result<()> {
    println!("--- Example 1: Basic Caching ---\n");

    let engine = CachedStatsEngine::with_defaults(dataset);
    let params = QueryParams::new()
        .with_location("lab")
        .with_sensor("temperature")
        .with_start_date("2024-02-10");

    for _ in 0..2 {
        let (stats, status) = engine.query(&params)?;
        println!("{}: {}", status, serde_json::to_string(&stats)?);
    }

    // Same instant, different spelling: a separate cache entry
    let respelled = params.clone().with_start_date("2024-02-10T00:00:00");
    let (_, status) = engine.query(&respelled)?;
    println!("Respelled start_date: {}", status);

    Ok(())
}

/// Example 2: Tiny cache to show LRU eviction
fn eviction(dataset: Arc<Dataset>) -> Result<()> {
    println!("\n--- Example 2: Eviction ---\n");

    let engine = CachedStatsEngine::new(dataset, CacheConfig::new(2));
    for location in ["lab", "roof", "basement", "lab"] {
        let (stats, status) = engine.query(&QueryParams::new().with_location(location))?;
        println!("{:<9} {} count={}", location, status, stats.count);
    }
    println!(
        "Resident entries: {}, computations: {}",
        engine.cache_size(),
        engine.cache_stats().computations()
    );

    Ok(())
}

/// Example 3: Counters after a mixed workload
fn cache_statistics(dataset: Arc<Dataset>) -> Result<()> {
    println!("\n--- Example 3: Cache Statistics ---\n");

    let engine = CachedStatsEngine::with_defaults(dataset);
    for i in 0..10 {
        let params = QueryParams::new().with_end_date(format!("2024-02-{:02}", 1 + i % 4));
        engine.query(&params)?;
    }
    if let Err(err) = engine.query(&QueryParams::new().with_start_date("last tuesday")) {
        println!("Rejected: {}", err);
    }

    let stats = engine.cache_stats();
    println!("Cache Statistics:");
    println!("  Hits:         {}", stats.hits());
    println!("  Misses:       {}", stats.misses());
    println!("  Hit Rate:     {:.1}%", stats.hit_rate() * 100.0);
    println!("  Computations: {}", stats.computations());
    println!("  Failures:     {}", stats.failures());
    println!("  Entries:      {}", stats.entry_count());

    Ok(())
}
