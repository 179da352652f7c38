// src/similarity.rs
//! String similarity primitives on a 0..100 scale.
//!
//! Base measure is the Indel-normalized ratio: `100 * (1 - indel / (|a| + |b|))`, where
//! the Indel distance (insertions + deletions only) equals `|a| + |b| - 2 * LCS(a, b)`.
//! The token variants split on whitespace and compare sorted/set-based reconstructions,
//! and `weighted_ratio` picks the best of them with length-dependent scaling.

use std::collections::BTreeSet;

/// Scale applied to token-based ratios so they never outrank a literal full match.
const UNBASE_SCALE: f64 = 0.95;
/// Length ratio from which partial alignments are considered.
const PARTIAL_LEN_RATIO: f64 = 1.5;
/// Length ratio from which partial alignments are scaled down hard.
const FAR_LEN_RATIO: f64 = 8.0;
const PARTIAL_SCALE_NEAR: f64 = 0.9;
const PARTIAL_SCALE_FAR: f64 = 0.6;

/// Longest common subsequence length, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; short.len() + 1];
    let mut cur = vec![0usize; short.len() + 1];
    for &lc in long {
        for (j, &sc) in short.iter().enumerate() {
            cur[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[short.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let indel = total - 2 * lcs_len(a, b);
    100.0 * (1.0 - indel as f64 / total as f64)
}

/// Indel-normalized similarity. Two empty strings are identical (100).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

fn partial_ratio_chars(a: &[char], b: &[char]) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }
    let m = short.len();
    let n = long.len();

    let mut best = 0.0f64;
    let mut consider = |window: &[char]| {
        let r = ratio_chars(short, window);
        if r > best {
            best = r;
        }
        best >= 100.0
    };

    // Windows sliding in from the left edge.
    for end in 1..m {
        if consider(&long[..end]) {
            return 100.0;
        }
    }
    // Full-width windows.
    for start in 0..=(n - m) {
        if consider(&long[start..start + m]) {
            return 100.0;
        }
    }
    // Windows sliding out past the right edge.
    for start in (n - m + 1)..n {
        if consider(&long[start..]) {
            return 100.0;
        }
    }
    best
}

/// Best ratio of the shorter string against any alignment window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    partial_ratio_chars(&a, &b)
}

fn sorted_tokens(s: &str) -> Vec<&str> {
    let mut toks: Vec<&str> = s.split_whitespace().collect();
    toks.sort_unstable();
    toks
}

fn token_set(s: &str) -> BTreeSet<&str> {
    s.split_whitespace().collect()
}

/// Ratio after sorting whitespace-separated tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

/// Token-set ratio: compares the shared tokens against each side's extras.
/// Returns 100 when the token sets intersect and one contains the other.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta = token_set(a);
    let tb = token_set(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let sect: Vec<&str> = ta.intersection(&tb).copied().collect();
    let diff_ab: Vec<&str> = ta.difference(&tb).copied().collect();
    let diff_ba: Vec<&str> = tb.difference(&ta).copied().collect();

    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab_joined: Vec<char> = diff_ab.join(" ").chars().collect();
    let diff_ba_joined: Vec<char> = diff_ba.join(" ").chars().collect();
    let ab_len = diff_ab_joined.len();
    let ba_len = diff_ba_joined.len();
    let sect_len = sect.join(" ").chars().count();

    // Lengths of "sect + ' ' + diff" for each side.
    let sep = usize::from(sect_len > 0);
    let sect_ab_len = sect_len + sep + ab_len;
    let sect_ba_len = sect_len + sep + ba_len;

    // diff_ab vs diff_ba, measured as if both carried the shared prefix
    let total = sect_ab_len + sect_ba_len;
    let dist = ab_len + ba_len - 2 * lcs_len(&diff_ab_joined, &diff_ba_joined);
    let mut result = 100.0 * (1.0 - dist as f64 / total as f64);

    if sect_len == 0 {
        return result;
    }

    // sect vs sect + diff, per side
    let sect_ab_ratio = 100.0 * (1.0 - (sep + ab_len) as f64 / (sect_len + sect_ab_len) as f64);
    let sect_ba_ratio = 100.0 * (1.0 - (sep + ba_len) as f64 / (sect_len + sect_ba_len) as f64);
    result = result.max(sect_ab_ratio).max(sect_ba_ratio);
    result
}

/// Partial alignment over token reconstructions. Any shared token scores 100.
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let ta = token_set(a);
    let tb = token_set(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    if ta.intersection(&tb).next().is_some() {
        return 100.0;
    }
    partial_ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

/// Holistic similarity tolerant of word reordering and partial substrings.
///
/// Similar lengths: best of the literal ratio and the scaled token ratios.
/// Dissimilar lengths: best of the literal ratio, the scaled partial ratio and the
/// scaled partial token ratio.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let ac: Vec<char> = a.chars().collect();
    let bc: Vec<char> = b.chars().collect();
    if ac.is_empty() || bc.is_empty() {
        return 0.0;
    }

    let base = ratio_chars(&ac, &bc);
    let (lo, hi) = if ac.len() <= bc.len() {
        (ac.len(), bc.len())
    } else {
        (bc.len(), ac.len())
    };
    let len_ratio = hi as f64 / lo as f64;

    if len_ratio < PARTIAL_LEN_RATIO {
        let tokens = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return base.max(tokens * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < FAR_LEN_RATIO {
        PARTIAL_SCALE_NEAR
    } else {
        PARTIAL_SCALE_FAR
    };

    let token_partial = partial_token_ratio(a, b) * UNBASE_SCALE;
    let best = base.max(token_partial);
    // The character-level partial ratio cannot exceed 100 * partial_scale.
    if best >= 100.0 * partial_scale {
        return best;
    }
    best.max(partial_ratio_chars(&ac, &bc) * partial_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn lcs_basics() {
        let a: Vec<char> = "ABCBDAB".chars().collect();
        let b: Vec<char> = "BDCABA".chars().collect();
        assert_eq!(lcs_len(&a, &b), 4);
        assert_eq!(lcs_len(&a, &[]), 0);
    }

    #[test]
    fn ratio_identity_and_disjoint() {
        assert!(close(ratio("PETRO", "PETRO"), 100.0));
        assert!(close(ratio("", ""), 100.0));
        assert!(close(ratio("ABC", "XYZ"), 0.0));
        assert!(close(ratio("ABC", ""), 0.0));
        // LCS("PETRO","PEDRO") = 4 -> 100 * 8 / 10
        assert!(close(ratio("PETRO", "PEDRO"), 80.0));
    }

    #[test]
    fn partial_ratio_finds_embedded_substring() {
        assert!(close(partial_ratio("PETRO", "GUSTAVO PETRO URREGO"), 100.0));
        assert!(close(partial_ratio("GUSTAVO PETRO URREGO", "PETRO"), 100.0));
        assert!(partial_ratio("PEDRO", "GUSTAVO PETRO URREGO") >= 80.0);
        assert!(close(partial_ratio("", ""), 100.0));
        assert!(close(partial_ratio("", "ABC"), 0.0));
    }

    #[test]
    fn token_sort_ignores_order() {
        assert!(close(token_sort_ratio("GUSTAVO PETRO", "PETRO GUSTAVO"), 100.0));
    }

    #[test]
    fn token_set_contained_is_full_score() {
        assert!(close(
            token_set_ratio("GUSTAVO PETRO", "PETRO URREGO GUSTAVO FRANCISCO"),
            100.0
        ));
        assert!(close(token_set_ratio("", "PETRO"), 0.0));
    }

    #[test]
    fn token_set_partial_overlap_is_between_bounds() {
        let r = token_set_ratio("GUSTAVO PETRO ALIAS", "PETRO GUSTAVO URREGO");
        assert!(r > 50.0 && r < 100.0, "got {r}");
    }

    #[test]
    fn token_set_disjoint_uses_diff_ratio() {
        // No shared tokens: result is the plain ratio of the sorted extras.
        let r = token_set_ratio("ABC", "ABD");
        assert!(close(r, ratio("ABC", "ABD")));
    }

    #[test]
    fn partial_token_ratio_shared_token_short_circuits() {
        assert!(close(partial_token_ratio("GUSTAVO PETRO", "PETRO HOLDINGS"), 100.0));
        assert!(partial_token_ratio("PEDRO", "PETRO HOLDINGS") < 100.0);
    }

    #[test]
    fn weighted_ratio_reordered_names() {
        let r = weighted_ratio("GUSTAVO PETRO", "PETRO GUSTAVO");
        assert!(close(r, 95.0), "got {r}");
        assert!(close(weighted_ratio("PETRO", "PETRO"), 100.0));
        assert!(close(weighted_ratio("", "PETRO"), 0.0));
    }

    #[test]
    fn weighted_ratio_contained_tokens_long_candidate() {
        let r = weighted_ratio("GUSTAVO PETRO", "PETRO URREGO GUSTAVO FRANCISCO");
        assert!(close(r, 95.0), "got {r}");
    }

    #[test]
    fn weighted_ratio_bounded() {
        for (a, b) in [
            ("AB", "ABABABABABABABABABAB"),
            ("XYZ", "ABCDEFGHIJKLMNOPQRSTUVWXYZ"),
            ("SAME NAME", "SAME NAME"),
        ] {
            let r = weighted_ratio(a, b);
            assert!((0.0..=100.0).contains(&r), "{a} / {b} -> {r}");
        }
    }
}
