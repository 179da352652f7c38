// src/screening.rs
//! Screening of extracted mention candidates and the interactive search composition.
//!
//! - `screen_mentions`: unique candidates → `best_match` at the configured flagging threshold.
//! - `search`: clamp limit → over-fetch ranked matches → collapse by core key.

use serde::Serialize;
use std::collections::HashSet;

use crate::dedupe::dedupe_by_core_with;
use crate::index::NameIndex;
use crate::matcher::{best_match, top_matches, MatchResult};
use crate::metrics::{ensure_metrics_described, record_lookup, LookupOutcome};
use crate::scoring::QueryProfile;

/// Candidate names shorter than this are dropped before lookup.
pub const MIN_CANDIDATE_CHARS: usize = 3;

/// Outcome of screening one text's candidate names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScreeningReport {
    /// Unique candidates, in first-seen order.
    pub candidates: Vec<String>,
    pub matches: Vec<MatchResult>,
    pub has_match: bool,
}

/// Trim, drop short names, and remove case-insensitive duplicates keeping first order.
pub fn unique_candidates<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for n in names {
        let n = n.as_ref().trim();
        if n.chars().count() < MIN_CANDIDATE_CHARS {
            continue;
        }
        if seen.insert(n.to_lowercase()) {
            out.push(n.to_string());
        }
    }
    out
}

/// Flag every candidate whose best match reaches the index's flagging threshold.
pub fn screen_mentions<S: AsRef<str>>(names: &[S], index: &NameIndex) -> ScreeningReport {
    ensure_metrics_described();
    let cfg = index.config();
    let threshold = cfg.thresholds.best_min_score;

    let candidates = unique_candidates(names);
    let mut matches = Vec::new();
    for c in &candidates {
        let m = best_match(c, index, threshold);
        let profile = QueryProfile::new(c, cfg);
        let outcome = match &m {
            Some(_) if index.exact_item(&profile.canonical).is_some() => LookupOutcome::Exact,
            Some(_) => LookupOutcome::Matched,
            None if profile.is_ambiguous(cfg) => LookupOutcome::Ambiguous,
            None => LookupOutcome::NoMatch,
        };
        record_lookup(outcome);
        if let Some(hit) = m {
            matches.push(hit);
        }
    }

    ScreeningReport {
        has_match: !matches.is_empty(),
        candidates,
        matches,
    }
}

/// Interactive search: ranked, deduplicated by core key, at most `limit` results.
pub fn search(query: &str, index: &NameIndex, limit: usize) -> Vec<MatchResult> {
    let q = query.trim();
    if q.is_empty() || index.is_empty() {
        return Vec::new();
    }
    let t = &index.config().thresholds;
    let limit = limit.clamp(1, t.search_limit_max);

    let ranked = top_matches(
        q,
        index,
        limit.saturating_mul(t.search_overfetch),
        t.search_min_score,
    );
    dedupe_by_core_with(&ranked, limit, index.config())
}
