// src/blocking.rs
//! Candidate retrieval through the inverted token index.
//!
//! Postings of the query tokens are merged rarest-first: each further posting is
//! intersected with the pool when that leaves something, otherwise unioned in. Merging
//! stops once the pool grows past `max_pool`.

use std::collections::BTreeSet;

use crate::index::{ItemId, NameIndex};

/// Candidate item ids for the given query tokens. Empty when no token is indexed.
pub fn retrieve<S: AsRef<str>>(
    query_tokens: &[S],
    index: &NameIndex,
    max_pool: usize,
) -> BTreeSet<ItemId> {
    let block_len = index.config().tokens.min_block_token_len;

    let distinct: BTreeSet<&str> = query_tokens
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| t.chars().count() >= block_len)
        .collect();

    // (token, posting); BTreeSet iteration gives a stable tie-break by token.
    let mut postings: Vec<(&str, &BTreeSet<ItemId>)> = distinct
        .into_iter()
        .filter_map(|t| index.postings(t).map(|ids| (t, ids)))
        .filter(|(_, ids)| !ids.is_empty())
        .collect();

    if postings.is_empty() {
        return BTreeSet::new();
    }

    // rarest first; sort is stable so equal sizes keep token order
    postings.sort_by_key(|(_, ids)| ids.len());

    let mut pool: BTreeSet<ItemId> = postings[0].1.clone();
    for (_, ids) in postings.iter().skip(1) {
        let inter: BTreeSet<ItemId> = pool.intersection(ids).copied().collect();
        if inter.is_empty() {
            pool.extend(ids.iter().copied());
        } else {
            pool = inter;
        }

        if pool.len() > max_pool {
            break;
        }
    }
    pool
}
