// src/metrics.rs
//! Metric names and one-time descriptions. Only the `metrics` facade is used here; the
//! embedding service decides which recorder/exporter to install.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up with help text once a recorder exists).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("screen_lookups_total", "Candidate names looked up.");
        describe_counter!(
            "screen_exact_hits_total",
            "Lookups resolved by exact canonical match."
        );
        describe_counter!(
            "screen_matches_total",
            "Lookups that produced a match (exact or fuzzy)."
        );
        describe_counter!(
            "screen_ambiguous_total",
            "Lookups rejected for having fewer than the minimum tokens."
        );
        describe_counter!("reference_refresh_total", "Successful reference index refreshes.");
        describe_counter!(
            "reference_refresh_errors_total",
            "Reference fetch/parse failures (old index kept)."
        );
        describe_counter!(
            "reference_fetch_errors_total",
            "Transport errors while downloading a reference list."
        );
        describe_histogram!(
            "reference_build_ms",
            "Reference index build time in milliseconds."
        );
        describe_gauge!("reference_index_items", "Items in the published index.");
        describe_gauge!(
            "reference_last_refresh_ts",
            "Unix ts of the last successful refresh."
        );
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Exact,
    Matched,
    Ambiguous,
    NoMatch,
}

pub fn record_lookup(outcome: LookupOutcome) {
    counter!("screen_lookups_total").increment(1);
    match outcome {
        LookupOutcome::Exact => {
            counter!("screen_exact_hits_total").increment(1);
            counter!("screen_matches_total").increment(1);
        }
        LookupOutcome::Matched => counter!("screen_matches_total").increment(1),
        LookupOutcome::Ambiguous => counter!("screen_ambiguous_total").increment(1),
        LookupOutcome::NoMatch => {}
    }
}

pub fn record_refresh(items: usize, build_ms: f64, now_ts: i64) {
    counter!("reference_refresh_total").increment(1);
    histogram!("reference_build_ms").record(build_ms);
    gauge!("reference_index_items").set(items as f64);
    gauge!("reference_last_refresh_ts").set(now_ts as f64);
}

pub fn record_refresh_error() {
    counter!("reference_refresh_errors_total").increment(1);
}
