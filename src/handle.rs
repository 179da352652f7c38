// src/handle.rs
//! Thread-safe handle to the currently published index.
//!
//! A refresh builds a complete `NameIndex` off to the side and `publish` swaps the shared
//! pointer in one step. Lookups take an `Arc` snapshot first, so an in-flight lookup keeps
//! seeing the index it started with even if a newer one is published meanwhile.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::index::NameIndex;
use crate::matcher::{best_match, top_matches, MatchResult};
use crate::screening::{screen_mentions, search, ScreeningReport};

#[derive(Clone)]
pub struct IndexHandle {
    inner: Arc<RwLock<Arc<NameIndex>>>,
    version: Arc<AtomicU64>,
}

impl IndexHandle {
    /// Start from an already built index (version 1).
    pub fn new(index: NameIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(index))),
            version: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Start with an empty index (version 0); every lookup yields no match until a publish.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(NameIndex::default()))),
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The complete index current at the time of the call.
    pub fn snapshot(&self) -> Arc<NameIndex> {
        match self.inner.read() {
            Ok(guard) => (*guard).clone(),
            // A panicking writer cannot leave a torn pointer behind.
            Err(poisoned) => (*poisoned.into_inner()).clone(),
        }
    }

    /// Swap in a new index; returns the new version.
    /// The version is bumped under the write lock, so versions follow swap order.
    pub fn publish(&self, index: NameIndex) -> u64 {
        let next = Arc::new(index);
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = next;
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn best_match(&self, name: &str, min_score: f64) -> Option<MatchResult> {
        best_match(name, &self.snapshot(), min_score)
    }

    pub fn top_matches(&self, name: &str, top_k: usize, min_score: f64) -> Vec<MatchResult> {
        top_matches(name, &self.snapshot(), top_k, min_score)
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<MatchResult> {
        search(query, &self.snapshot(), limit)
    }

    pub fn screen<S: AsRef<str>>(&self, names: &[S]) -> ScreeningReport {
        screen_mentions(names, &self.snapshot())
    }
}

impl Default for IndexHandle {
    fn default() -> Self {
        Self::empty()
    }
}
