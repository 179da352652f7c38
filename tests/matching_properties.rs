// tests/matching_properties.rs
//
// Property checks over small synthetic reference lists drawn from a shared vocabulary,
// so queries and listings overlap often enough to exercise blocking and the gates.

use proptest::prelude::*;
use proptest::sample::{select, Index};
use std::collections::BTreeSet;

use watchlist_screener::normalize::{normalize_name, tokenize};
use watchlist_screener::scoring::{round_score, score_candidate, QueryProfile};
use watchlist_screener::{
    best_match, build_index, dedupe_by_core, top_matches, MatchResult, MatcherConfig,
    NameIndex, ReferenceEntry,
};

const VOCAB: &[&str] = &[
    "PETRO", "URREGO", "GUSTAVO", "FRANCISCO", "MADURO", "MOROS", "NICOLAS", "ACME",
    "TRADING", "BANK", "HOLDINGS", "GARCIA", "LOPEZ", "MARIA", "JOSE", "AL",
];

// Blockable tokens (3+ chars) only.
const QUERY_VOCAB: &[&str] = &[
    "PETRO", "URREGO", "GUSTAVO", "FRANCISCO", "MADURO", "MOROS", "NICOLAS", "ACME",
    "TRADING", "BANK", "HOLDINGS", "GARCIA", "LOPEZ", "MARIA", "JOSE",
];

fn name(min: usize, max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(select(VOCAB), min..=max).prop_map(|t| t.join(" "))
}

fn entries(min_tokens: usize) -> impl Strategy<Value = Vec<ReferenceEntry>> {
    prop::collection::vec(name(min_tokens, 4), 1..24).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(i, n)| ReferenceEntry::new(i.to_string(), n))
            .collect()
    })
}

fn two_token_query() -> impl Strategy<Value = String> {
    (select(QUERY_VOCAB), select(QUERY_VOCAB))
        .prop_filter("distinct tokens", |(a, b)| a != b)
        .prop_map(|(a, b)| format!("{} {}", a.to_lowercase(), b))
}

fn token_set(s: &str) -> BTreeSet<String> {
    tokenize(&normalize_name(s), &MatcherConfig::default())
        .into_iter()
        .collect()
}

fn everything(q: &str, idx: &NameIndex, min_score: f64) -> Vec<MatchResult> {
    top_matches(q, idx, idx.len() + 1, min_score)
}

proptest! {
    #[test]
    fn exact_canonical_queries_return_first_listing(list in entries(1), pick in any::<Index>()) {
        let idx = build_index(list.clone());
        let entry = pick.get(&list);
        let canonical = normalize_name(&entry.name);
        // Lower-cased, comma-separated variant of the listing name.
        let variant = entry.name.to_lowercase().replace(' ', ", ");

        let m = best_match(&variant, &idx, 92.0).expect("exact hit");
        prop_assert_eq!(m.score, 100.0);
        prop_assert_eq!(&m.matched_canonical, &canonical);

        let first = list.iter().find(|e| normalize_name(&e.name) == canonical).unwrap();
        prop_assert_eq!(&m.entry, first);
    }

    #[test]
    fn single_token_queries_never_match(list in entries(2), q in select(VOCAB)) {
        let idx = build_index(list);
        prop_assert!(best_match(q, &idx, 0.0).is_none());
        prop_assert!(top_matches(q, &idx, 50, 0.0).is_empty());
    }

    #[test]
    fn every_result_shares_two_tokens(list in entries(1), q in name(1, 4)) {
        let idx = build_index(list);
        let qs = token_set(&q);

        for m in everything(&q, &idx, 0.0) {
            let shared = qs.intersection(&token_set(&m.matched_canonical)).count();
            prop_assert!(shared >= 2, "{} vs {}", q, m.matched_canonical);
        }

        if let Some(m) = best_match(&q, &idx, 0.0) {
            let exact = m.matched_canonical == normalize_name(&q);
            let shared = qs.intersection(&token_set(&m.matched_canonical)).count();
            prop_assert!(exact || shared >= 2);
        }
    }

    #[test]
    fn raising_threshold_never_grows_results(
        list in entries(1),
        q in two_token_query(),
        a in 0.0f64..103.0,
        b in 0.0f64..103.0,
    ) {
        let idx = build_index(list);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(everything(&q, &idx, lo).len() >= everything(&q, &idx, hi).len());
    }

    #[test]
    fn dedupe_is_idempotent(list in entries(1), q in two_token_query(), k in 1usize..10) {
        let idx = build_index(list);
        let once = dedupe_by_core(&everything(&q, &idx, 0.0), k);
        let twice = dedupe_by_core(&once, k);
        prop_assert_eq!(once, twice);
    }

    // Two-token queries only: an item passes the overlap gate only if it holds both
    // tokens, and rarest-first intersection always keeps those. With three or more
    // tokens blocking can drop gate-passing listings (pinned in matching_scenarios).
    #[test]
    fn blocking_matches_brute_force(list in entries(1), q in two_token_query(), min in 0.0f64..100.0) {
        let idx = build_index(list);
        let cfg = idx.config();
        let profile = QueryProfile::new(&q, cfg);

        let mut brute: Vec<(String, f64)> = idx
            .items()
            .iter()
            .filter_map(|it| {
                let s = score_candidate(&profile, it, cfg)?;
                (s >= min).then(|| (it.canonical.clone(), round_score(s)))
            })
            .collect();
        let mut got: Vec<(String, f64)> = everything(&q, &idx, min)
            .into_iter()
            .map(|m| (m.matched_canonical, m.score))
            .collect();

        let by_name_then_score = |x: &(String, f64), y: &(String, f64)| {
            x.0.cmp(&y.0).then(x.1.total_cmp(&y.1))
        };
        brute.sort_by(by_name_then_score);
        got.sort_by(by_name_then_score);

        prop_assert_eq!(brute.len(), got.len());
        for (b, g) in brute.iter().zip(got.iter()) {
            prop_assert_eq!(&b.0, &g.0);
            prop_assert!((b.1 - g.1).abs() < 1e-9);
        }
    }
}
