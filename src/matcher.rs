// src/matcher.rs
//! Lookup entry points: single best match for automatic flagging and ranked top-k for
//! interactive search.
//!
//! Order for `best_match`: exact canonical hit (score 100) → ambiguity gate → blocking →
//! gated composite scoring → threshold on the single best candidate.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::info;

use crate::blocking::retrieve;
use crate::index::{NameIndex, ReferenceEntry};
use crate::scoring::{round_score, score_candidate, QueryProfile};

/// Score reported for an exact canonical hit.
pub const EXACT_SCORE: f64 = 100.0;

/// One resolved candidate name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The name as it was queried.
    pub candidate_name: String,
    /// Canonical form of the matched reference entry.
    pub matched_canonical: String,
    /// Composite score rounded to one decimal, within [0, 103].
    pub score: f64,
    pub entry: ReferenceEntry,
}

// Dev logging gate: MATCHER_DEV_LOG=1 AND dev env (debug or APP_ENV in {local,development,dev})
static DEV_LOG: Lazy<bool> = Lazy::new(|| {
    let on = std::env::var("MATCHER_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
});

/// Short SHA-256 prefix used in place of names in logs.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Never logs raw names: only the hashed query id and numbers.
fn dev_log_lookup(event: &str, query: &str, pool: usize, score: f64, threshold: f64) {
    if !*DEV_LOG {
        return;
    }
    let id = anon_hash(query);
    info!(target: "matcher", %id, pool, %score, %threshold, event);
}

/// Highest-scoring reference entry for `name`, if it reaches `min_score`.
pub fn best_match(name: &str, index: &NameIndex, min_score: f64) -> Option<MatchResult> {
    let cfg = index.config();
    let query = QueryProfile::new(name, cfg);
    if query.canonical.is_empty() {
        return None;
    }

    // 1) Exact canonical hit
    if let Some(item) = index.exact_item(&query.canonical) {
        dev_log_lookup("exact", &query.canonical, 0, EXACT_SCORE, min_score);
        return Some(MatchResult {
            candidate_name: name.to_string(),
            matched_canonical: item.canonical.clone(),
            score: EXACT_SCORE,
            entry: item.entry.clone(),
        });
    }

    // 2) Single tokens are too ambiguous
    if query.is_ambiguous(cfg) {
        dev_log_lookup("ambiguous", &query.canonical, 0, 0.0, min_score);
        return None;
    }

    // 3) Blocking + gated scoring
    let pool = retrieve(&query.tokens, index, cfg.blocking.max_pool);
    let mut best: Option<(f64, usize)> = None;
    for &id in &pool {
        let Some(item) = index.item(id) else {
            continue;
        };
        let Some(score) = score_candidate(&query, item, cfg) else {
            continue;
        };
        if best.map_or(true, |(b, _)| score > b) {
            best = Some((score, id));
        }
    }

    let (score, id) = match best {
        Some(b) => b,
        None => {
            dev_log_lookup("no_candidate", &query.canonical, pool.len(), 0.0, min_score);
            return None;
        }
    };

    if score < min_score {
        dev_log_lookup("below_threshold", &query.canonical, pool.len(), score, min_score);
        return None;
    }

    let item = index.item(id)?;
    dev_log_lookup("matched", &query.canonical, pool.len(), score, min_score);
    Some(MatchResult {
        candidate_name: name.to_string(),
        matched_canonical: item.canonical.clone(),
        score: round_score(score),
        entry: item.entry.clone(),
    })
}

/// Every candidate scoring at least `min_score`, best first (ties by canonical name),
/// truncated to `top_k` (at least one). Not deduplicated.
pub fn top_matches(name: &str, index: &NameIndex, top_k: usize, min_score: f64) -> Vec<MatchResult> {
    let cfg = index.config();
    let query = QueryProfile::new(name, cfg);
    if query.is_ambiguous(cfg) {
        return Vec::new();
    }

    let pool = retrieve(&query.tokens, index, cfg.blocking.max_pool);
    let mut scored: Vec<MatchResult> = pool
        .iter()
        .filter_map(|&id| index.item(id))
        .filter_map(|item| {
            let score = score_candidate(&query, item, cfg)?;
            (score >= min_score).then(|| MatchResult {
                candidate_name: name.to_string(),
                matched_canonical: item.canonical.clone(),
                score: round_score(score),
                entry: item.entry.clone(),
            })
        })
        .collect();

    scored.sort_by(rank_order);
    scored.truncate(top_k.max(1));

    dev_log_lookup(
        "ranked",
        &query.canonical,
        pool.len(),
        scored.first().map_or(0.0, |m| m.score),
        min_score,
    );
    scored
}

/// Descending score, then ascending canonical name.
pub fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.matched_canonical.cmp(&b.matched_canonical))
}
