// src/config.rs
//! Matcher configuration: scoring weights, thresholds, token cutoffs, blocking cap and the
//! entity lexicon. Loaded from TOML with env overrides; every key has a documented default.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::normalize::normalize_name;

// --- env defaults & names ---
pub const DEFAULT_MATCHER_CONFIG_PATH: &str = "config/matcher.toml";
pub const ENV_MATCHER_CONFIG_PATH: &str = "MATCHER_CONFIG_PATH";
pub const ENV_MATCHER_MIN_SCORE: &str = "MATCHER_MIN_SCORE";
pub const ENV_MATCHER_SEARCH_MIN_SCORE: &str = "MATCHER_SEARCH_MIN_SCORE";

/// Highest score the composite can produce (100 + subset bonus).
pub const MAX_SCORE: f64 = 103.0;

/// Organizational markers; a single hit classifies a name as entity-like.
pub const DEFAULT_ENTITY_MARKERS: &[&str] = &[
    "COMPANY",
    "CO",
    "CORP",
    "CORPORATION",
    "INC",
    "INCORPORATED",
    "LLC",
    "LTD",
    "LIMITED",
    "S",
    "A",
    "SA",
    "SAS",
    "AG",
    "GMBH",
    "BV",
    "NV",
    "SPA",
    "SRL",
    "SRO",
    "BANK",
    "BANCO",
    "TRUST",
    "HOLDINGS",
    "HOLDING",
    "GROUP",
    "GRUPO",
    "FUND",
    "FOUNDATION",
];

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub scoring: ScoringCfg,
    pub thresholds: ThresholdCfg,
    pub tokens: TokenCfg,
    pub blocking: BlockingCfg,
    pub lexicon: LexiconCfg,
}

/// Weights of the three similarity signals plus heuristic adjustments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringCfg {
    /// Weight of the reorder-tolerant string ratio (s1).
    pub ratio_weight: f64,
    /// Weight of the token-set ratio (s2).
    pub token_set_weight: f64,
    /// Weight of the Jaccard token overlap, scaled to 0..100 (j).
    pub jaccard_weight: f64,
    /// Subtracted when a person-like query meets an entity-like candidate.
    pub cross_category_penalty: f64,
    /// Added when every query token appears in the candidate.
    pub subset_bonus: f64,
}

impl Default for ScoringCfg {
    fn default() -> Self {
        Self {
            ratio_weight: 0.55,
            token_set_weight: 0.30,
            jaccard_weight: 0.15,
            cross_category_penalty: 8.0,
            subset_bonus: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdCfg {
    /// Minimum score for automatic flagging (`best_match`).
    pub best_min_score: f64,
    /// Minimum score for interactive search (`top_matches`).
    pub search_min_score: f64,
    pub search_limit_max: usize,
    /// Search fetches `limit * search_overfetch` (saturating) ranked matches before dedupe.
    pub search_overfetch: usize,
}

impl Default for ThresholdCfg {
    fn default() -> Self {
        Self {
            best_min_score: 92.0,
            search_min_score: 80.0,
            search_limit_max: 50,
            search_overfetch: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TokenCfg {
    /// Tokens shorter than this are dropped by the tokenizer.
    pub min_token_len: usize,
    /// Tokens shorter than this never enter the posting lists.
    pub min_block_token_len: usize,
    /// Queries with fewer tokens are rejected as ambiguous.
    pub min_query_tokens: usize,
    /// Candidates sharing fewer distinct tokens with the query are discarded.
    pub min_overlap: usize,
}

impl Default for TokenCfg {
    fn default() -> Self {
        Self {
            min_token_len: 2,
            min_block_token_len: 3,
            min_query_tokens: 2,
            min_overlap: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlockingCfg {
    /// Candidate pool size after which blocking stops merging postings.
    pub max_pool: usize,
}

impl Default for BlockingCfg {
    fn default() -> Self {
        Self { max_pool: 5000 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LexiconCfg {
    pub entity_markers: Vec<String>,
}

impl Default for LexiconCfg {
    fn default() -> Self {
        Self {
            entity_markers: DEFAULT_ENTITY_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// parse optional score env and clamp to <0.0..=MAX_SCORE>
fn parse_score_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, MAX_SCORE))
}

impl MatcherConfig {
    /// Load from a TOML file. Uses MATCHER_CONFIG_PATH or defaults to "config/matcher.toml".
    pub fn from_toml() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_MATCHER_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MATCHER_CONFIG_PATH));
        Self::from_path(&path)
    }

    /// Load from an explicit TOML file, then apply env overrides.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading matcher config at {}", path.display()))?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Like `from_toml`, but a missing default file yields built-in defaults.
    /// An explicitly configured path that cannot be read is still an error.
    pub fn load_default() -> anyhow::Result<Self> {
        let explicit = std::env::var(ENV_MATCHER_CONFIG_PATH).is_ok();
        if explicit || PathBuf::from(DEFAULT_MATCHER_CONFIG_PATH).exists() {
            return Self::from_toml();
        }
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Load from a TOML string (no env overrides).
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: MatcherConfig = toml::from_str(toml_str).context("parsing matcher config")?;
        cfg.validate()?;
        cfg.lexicon.entity_markers = canonical_markers(&cfg.lexicon.entity_markers);
        Ok(cfg)
    }

    /// Override thresholds from MATCHER_MIN_SCORE / MATCHER_SEARCH_MIN_SCORE.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = parse_score_env(std::env::var(ENV_MATCHER_MIN_SCORE).ok()) {
            self.thresholds.best_min_score = v;
        }
        if let Some(v) = parse_score_env(std::env::var(ENV_MATCHER_SEARCH_MIN_SCORE).ok()) {
            self.thresholds.search_min_score = v;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let s = &self.scoring;
        for (name, w) in [
            ("ratio_weight", s.ratio_weight),
            ("token_set_weight", s.token_set_weight),
            ("jaccard_weight", s.jaccard_weight),
            ("cross_category_penalty", s.cross_category_penalty),
            ("subset_bonus", s.subset_bonus),
        ] {
            if !w.is_finite() || w < 0.0 {
                bail!("scoring.{name} must be a finite non-negative number, got {w}");
            }
        }

        let t = &self.thresholds;
        for (name, v) in [
            ("best_min_score", t.best_min_score),
            ("search_min_score", t.search_min_score),
        ] {
            if !v.is_finite() {
                bail!("thresholds.{name} must be finite, got {v}");
            }
        }
        if t.search_limit_max == 0 {
            bail!("thresholds.search_limit_max must be >= 1");
        }
        if t.search_overfetch == 0 {
            bail!("thresholds.search_overfetch must be >= 1");
        }

        let k = &self.tokens;
        for (name, v) in [
            ("min_token_len", k.min_token_len),
            ("min_block_token_len", k.min_block_token_len),
            ("min_query_tokens", k.min_query_tokens),
            ("min_overlap", k.min_overlap),
        ] {
            if v == 0 {
                bail!("tokens.{name} must be >= 1");
            }
        }

        if self.blocking.max_pool == 0 {
            bail!("blocking.max_pool must be >= 1");
        }
        Ok(())
    }

    pub fn is_entity_marker(&self, token: &str) -> bool {
        self.lexicon.entity_markers.iter().any(|m| m == token)
    }
}

/// Markers are compared against canonical tokens, so run them through the same normalizer.
fn canonical_markers(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = raw
        .iter()
        .map(|m| normalize_name(m))
        .filter(|m| !m.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
