// src/index.rs
//! Immutable reference index: canonical forms, token sets, entity flags and the inverted
//! token -> item-id postings used for blocking.
//!
//! Built in a single deterministic pass with no dependency on a previous index, so a
//! refresh always constructs a complete new value that is published as a unit.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::config::MatcherConfig;
use crate::normalize::{looks_like_entity, normalize_name, tokenize};

/// Stable position of an item inside `NameIndex::items`.
pub type ItemId = usize;

/// One watchlist record as supplied by the reference loader.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(default)]
    pub uid: Option<String>,
    pub name: String,
    /// Source classification, e.g. "Individual" / "Entity".
    #[serde(default, alias = "type")]
    pub category: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl ReferenceEntry {
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            name: name.into(),
            category: None,
            remarks: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A reference entry with its derived matching features.
#[derive(Debug, Clone)]
pub struct IndexedItem {
    pub canonical: String,
    pub tokens: Vec<String>,
    pub token_set: BTreeSet<String>,
    pub is_entity_like: bool,
    pub entry: ReferenceEntry,
}

/// Read-only index over one reference-list snapshot.
#[derive(Debug, Clone)]
pub struct NameIndex {
    items: Vec<IndexedItem>,
    token_postings: HashMap<String, BTreeSet<ItemId>>,
    /// canonical -> first item carrying it
    canonical_to_entry: HashMap<String, ItemId>,
    config: MatcherConfig,
}

/// Size summary for logs and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub entries_seen: usize,
    pub items: usize,
    pub skipped: usize,
    pub distinct_canonicals: usize,
    pub posting_tokens: usize,
    pub largest_posting: usize,
}

impl NameIndex {
    /// Build with the default configuration.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ReferenceEntry>,
    {
        Self::build_with(entries, MatcherConfig::default())
    }

    /// Build an index; entries whose name normalizes to nothing (or to no tokens) are skipped.
    pub fn build_with<I>(entries: I, config: MatcherConfig) -> Self
    where
        I: IntoIterator<Item = ReferenceEntry>,
    {
        let mut items: Vec<IndexedItem> = Vec::new();
        let mut token_postings: HashMap<String, BTreeSet<ItemId>> = HashMap::new();
        let mut canonical_to_entry: HashMap<String, ItemId> = HashMap::new();
        let block_len = config.tokens.min_block_token_len;

        for entry in entries {
            let canonical = normalize_name(&entry.name);
            if canonical.is_empty() {
                continue;
            }
            let tokens = tokenize(&canonical, &config);
            if tokens.is_empty() {
                continue;
            }

            let id = items.len();
            let is_entity_like = looks_like_entity(&tokens, &config);
            let token_set: BTreeSet<String> = tokens.iter().cloned().collect();

            canonical_to_entry.entry(canonical.clone()).or_insert(id);

            for t in token_set.iter() {
                if t.chars().count() < block_len {
                    continue;
                }
                token_postings.entry(t.clone()).or_default().insert(id);
            }

            items.push(IndexedItem {
                canonical,
                tokens,
                token_set,
                is_entity_like,
                entry,
            });
        }

        Self {
            items,
            token_postings,
            canonical_to_entry,
            config,
        }
    }

    pub fn items(&self) -> &[IndexedItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&IndexedItem> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Posting set for a canonical token, if it was indexed for blocking.
    pub fn postings(&self, token: &str) -> Option<&BTreeSet<ItemId>> {
        self.token_postings.get(token)
    }

    pub fn posting_tokens(&self) -> impl Iterator<Item = &str> {
        self.token_postings.keys().map(String::as_str)
    }

    /// First item registered under an exact canonical form.
    pub fn exact_item(&self, canonical: &str) -> Option<&IndexedItem> {
        self.canonical_to_entry
            .get(canonical)
            .and_then(|&id| self.items.get(id))
    }

    /// First entry registered under an exact canonical form.
    pub fn entry_for_canonical(&self, canonical: &str) -> Option<&ReferenceEntry> {
        self.exact_item(canonical).map(|it| &it.entry)
    }

    pub fn canonical_count(&self) -> usize {
        self.canonical_to_entry.len()
    }

    pub fn stats(&self, entries_seen: usize) -> IndexStats {
        IndexStats {
            entries_seen,
            items: self.items.len(),
            skipped: entries_seen.saturating_sub(self.items.len()),
            distinct_canonicals: self.canonical_to_entry.len(),
            posting_tokens: self.token_postings.len(),
            largest_posting: self
                .token_postings
                .values()
                .map(BTreeSet::len)
                .max()
                .unwrap_or(0),
        }
    }
}

impl Default for NameIndex {
    fn default() -> Self {
        Self::build(Vec::new())
    }
}
