// src/dedupe.rs
//! Collapse near-duplicate listings in ranked results.
//!
//! Watchlists are surname-first, so the first two tokens of a canonical name usually
//! identify one individual across middle-name, suffix and transliteration variants.
//! The reduction is greedy and keeps the first match per key; input must already be
//! sorted best-first.

use std::collections::HashSet;

use crate::config::MatcherConfig;
use crate::matcher::MatchResult;
use crate::normalize::{normalize_name, tokenize};

/// Grouping key: the first two tokens, or the name itself when it has fewer.
pub fn core_key(name: &str) -> String {
    core_key_with(name, &MatcherConfig::default())
}

pub fn core_key_with(name: &str, cfg: &MatcherConfig) -> String {
    let toks = tokenize(&normalize_name(name), cfg);
    if toks.len() < 2 {
        return name.to_string();
    }
    format!("{}|{}", toks[0], toks[1])
}

/// Keep the first match per core key, stopping at `top_k` (at least one) results.
pub fn dedupe_by_core(matches: &[MatchResult], top_k: usize) -> Vec<MatchResult> {
    dedupe_by_core_with(matches, top_k, &MatcherConfig::default())
}

/// As [`dedupe_by_core`], keyed with the index's own token cutoff.
pub fn dedupe_by_core_with(
    matches: &[MatchResult],
    top_k: usize,
    cfg: &MatcherConfig,
) -> Vec<MatchResult> {
    let limit = top_k.max(1);
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(limit.min(matches.len()));
    for m in matches {
        if !seen.insert(core_key_with(&m.matched_canonical, cfg)) {
            continue;
        }
        out.push(m.clone());
        if out.len() >= limit {
            break;
        }
    }
    out
}
