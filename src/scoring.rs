// src/scoring.rs
//! Composite scoring with hard overlap gates and heuristic adjustments.
//!
//! score = w1 * weighted_ratio(q, c) + w2 * token_set_ratio(q, c) + w3 * jaccard(Q, C)
//!         - cross_category_penalty   (person-like query vs entity-like candidate)
//!         + subset_bonus             (Q ⊆ C)

use std::collections::BTreeSet;

use crate::config::MatcherConfig;
use crate::index::IndexedItem;
use crate::normalize::{looks_like_entity, normalize_name, tokenize};
use crate::similarity::{token_set_ratio, weighted_ratio};

/// A query reduced to the features the scorer needs.
#[derive(Debug, Clone)]
pub struct QueryProfile {
    pub canonical: String,
    pub tokens: Vec<String>,
    pub token_set: BTreeSet<String>,
    pub is_entity_like: bool,
}

impl QueryProfile {
    pub fn new(raw: &str, cfg: &MatcherConfig) -> Self {
        let canonical = normalize_name(raw);
        let tokens = tokenize(&canonical, cfg);
        let token_set = tokens.iter().cloned().collect();
        let is_entity_like = looks_like_entity(&tokens, cfg);
        Self {
            canonical,
            tokens,
            token_set,
            is_entity_like,
        }
    }

    /// Too few tokens to be matched against a sanctions list.
    pub fn is_ambiguous(&self, cfg: &MatcherConfig) -> bool {
        self.canonical.is_empty() || self.tokens.len() < cfg.tokens.min_query_tokens
    }
}

/// Per-signal breakdown of one query/candidate comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreParts {
    pub ratio: f64,
    pub token_set: f64,
    pub jaccard: f64,
    pub penalty: f64,
    pub bonus: f64,
    pub total: f64,
}

/// Number of distinct tokens shared by query and candidate.
pub fn token_overlap(query: &QueryProfile, item: &IndexedItem) -> usize {
    query.token_set.intersection(&item.token_set).count()
}

/// Composite score without the overlap gate.
pub fn composite(query: &QueryProfile, item: &IndexedItem, cfg: &MatcherConfig) -> ScoreParts {
    let s = &cfg.scoring;

    let overlap = token_overlap(query, item);
    let union = query.token_set.union(&item.token_set).count().max(1);

    let ratio = weighted_ratio(&query.canonical, &item.canonical);
    let token_set = token_set_ratio(&query.canonical, &item.canonical);
    let jaccard = 100.0 * overlap as f64 / union as f64;

    let penalty = if !query.is_entity_like && item.is_entity_like {
        s.cross_category_penalty
    } else {
        0.0
    };
    let bonus = if query.token_set.is_subset(&item.token_set) {
        s.subset_bonus
    } else {
        0.0
    };

    let total = s.ratio_weight * ratio + s.token_set_weight * token_set + s.jaccard_weight * jaccard
        - penalty
        + bonus;

    ScoreParts {
        ratio,
        token_set,
        jaccard,
        penalty,
        bonus,
        total,
    }
}

/// Gated score: `None` when the candidate shares fewer than `min_overlap` tokens with the query.
pub fn score_candidate(query: &QueryProfile, item: &IndexedItem, cfg: &MatcherConfig) -> Option<f64> {
    if token_overlap(query, item) < cfg.tokens.min_overlap {
        return None;
    }
    Some(composite(query, item, cfg).total)
}

/// Round to one decimal for reporting.
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}
