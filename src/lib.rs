// src/lib.rs
// Public library surface for the CLI, integration tests and embedding services.

pub mod blocking;
pub mod config;
pub mod dedupe;
pub mod handle;
pub mod index;
pub mod matcher;
pub mod metrics;
pub mod normalize;
pub mod reference;
pub mod refresh;
pub mod scoring;
pub mod screening;
pub mod similarity;

// ---- Re-exports for stable public API ----
pub use crate::config::MatcherConfig;
pub use crate::dedupe::{core_key, dedupe_by_core, dedupe_by_core_with};
pub use crate::handle::IndexHandle;
pub use crate::index::{IndexStats, IndexedItem, ItemId, NameIndex, ReferenceEntry};
pub use crate::matcher::{best_match, top_matches, MatchResult};
pub use crate::normalize::normalize_name;
pub use crate::screening::{screen_mentions, search, ScreeningReport};

/// Build an index from reference entries with the default configuration.
pub fn build_index<I>(entries: I) -> NameIndex
where
    I: IntoIterator<Item = ReferenceEntry>,
{
    NameIndex::build(entries)
}
