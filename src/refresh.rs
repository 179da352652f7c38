// src/refresh.rs
//! Periodic rebuild of the reference index.
//!
//! Each cycle fetches the full list, builds a fresh `NameIndex` and publishes it through
//! the handle. A failed fetch leaves the currently published index in place.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::config::MatcherConfig;
use crate::handle::IndexHandle;
use crate::index::{IndexStats, NameIndex};
use crate::metrics::{ensure_metrics_described, record_refresh, record_refresh_error};
use crate::reference::{fetch_with_meta, ReferenceSource};

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 12 * 60 * 60;

#[derive(Clone, Debug)]
pub struct RefreshCfg {
    pub interval_secs: u64,
    pub config: MatcherConfig,
}

impl Default for RefreshCfg {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            config: MatcherConfig::default(),
        }
    }
}

/// Fetch, build and publish once.
pub async fn refresh_once(
    handle: &IndexHandle,
    source: &dyn ReferenceSource,
    config: &MatcherConfig,
) -> Result<IndexStats> {
    ensure_metrics_described();

    let (entries, meta) = match fetch_with_meta(source).await {
        Ok(v) => v,
        Err(e) => {
            record_refresh_error();
            tracing::warn!(
                target: "refresh",
                source = source.name(),
                error = %format!("{e:#}"),
                "reference fetch failed; keeping current index"
            );
            return Err(e);
        }
    };

    let t0 = Instant::now();
    let seen = entries.len();
    let index = NameIndex::build_with(entries, config.clone());
    let stats = index.stats(seen);
    let build_ms = t0.elapsed().as_secs_f64() * 1_000.0;

    let version = handle.publish(index);
    record_refresh(stats.items, build_ms, chrono::Utc::now().timestamp());

    tracing::info!(
        target: "refresh",
        source = %meta.source,
        fetched_at = %meta.fetched_at_utc,
        entries = stats.entries_seen,
        items = stats.items,
        skipped = stats.skipped,
        build_ms,
        version,
        "reference index published"
    );
    Ok(stats)
}

/// Refresh immediately, then every `cfg.interval_secs`.
pub fn spawn_refresh_scheduler(
    handle: IndexHandle,
    source: Arc<dyn ReferenceSource>,
    cfg: RefreshCfg,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(cfg.interval_secs.max(1)));
        loop {
            ticker.tick().await;
            // Errors are logged and counted inside.
            let _ = refresh_once(&handle, source.as_ref(), &cfg.config).await;
        }
    })
}
