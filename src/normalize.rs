// src/normalize.rs
//! Canonical name form shared by index building and query handling.
//!
//! - Uppercase fold
//! - NFKD decomposition with combining marks removed ("PETRÓ" -> "PETRO")
//! - Everything outside `A-Z`, `Ñ` and space becomes a space
//! - Whitespace collapsed, ends trimmed
//!
//! Tokenization splits the canonical form on spaces and drops short fragments;
//! classification flags organization-like names from a marker lexicon.

use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

use crate::config::MatcherConfig;

/// Accented consonant kept as part of the canonical alphabet.
const RESERVED_LETTER: char = 'Ñ';

#[inline]
fn in_alphabet(c: char) -> bool {
    c.is_ascii_uppercase() || c == RESERVED_LETTER
}

/// Normalize a raw name into its canonical form. Pure; may return an empty string.
pub fn normalize_name(s: &str) -> String {
    let upper = s.to_uppercase();

    let mut out = String::with_capacity(upper.len());
    let mut pending_space = false;
    for c in upper.nfkd() {
        if canonical_combining_class(c) != 0 {
            continue;
        }
        if in_alphabet(c) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Split a canonical name into tokens, dropping fragments shorter than `min_len` characters.
pub fn tokenize_with(canonical: &str, min_len: usize) -> Vec<String> {
    canonical
        .split(' ')
        .filter(|t| t.chars().count() >= min_len)
        .map(str::to_string)
        .collect()
}

/// Tokenize with the configured cutoff.
pub fn tokenize(canonical: &str, cfg: &MatcherConfig) -> Vec<String> {
    tokenize_with(canonical, cfg.tokens.min_token_len)
}

/// True when at least one token is an organizational marker. Soft signal only.
pub fn looks_like_entity<S: AsRef<str>>(tokens: &[S], cfg: &MatcherConfig) -> bool {
    tokens.iter().any(|t| cfg.is_entity_marker(t.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_folds_case() {
        assert_eq!(normalize_name("Petró Urrego"), "PETRO URREGO");
        assert_eq!(normalize_name("Société Générale"), "SOCIETE GENERALE");
        assert_eq!(normalize_name("Müller-Lüdenscheidt"), "MULLER LUDENSCHEIDT");
    }

    #[test]
    fn punctuation_and_digits_become_separators() {
        assert_eq!(
            normalize_name("PETRO URREGO, Gustavo Francisco"),
            "PETRO URREGO GUSTAVO FRANCISCO"
        );
        assert_eq!(normalize_name("  AL-QAIDA (2001)  "), "AL QAIDA");
        assert_eq!(normalize_name("O'Neil\tJr."), "O NEIL JR");
    }

    #[test]
    fn degenerate_inputs_normalize_to_empty() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
        assert_eq!(normalize_name("12345 !!"), "");
        assert_eq!(normalize_name("王小明"), "");
    }

    #[test]
    fn enye_decomposes_to_base_letter() {
        // NFKD splits Ñ into N + combining tilde before the alphabet filter runs.
        assert_eq!(normalize_name("Peña Nieto"), "PENA NIETO");
    }

    #[test]
    fn compatibility_forms_fold() {
        assert_eq!(normalize_name("Ｐｅｔｒｏ"), "PETRO");
        assert_eq!(normalize_name("Straße"), "STRASSE");
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in ["Petró, Gustavo", "a  b   c", "ÀÉÎÕÜ x", "Ñandú"] {
            let once = normalize_name(s);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn tokenizer_drops_single_letters() {
        assert_eq!(
            tokenize_with("PETRO G URREGO", 2),
            vec!["PETRO".to_string(), "URREGO".into()]
        );
        assert!(tokenize_with("", 2).is_empty());
        assert!(tokenize_with("A B C", 2).is_empty());
    }

    #[test]
    fn entity_classification_uses_lexicon() {
        let cfg = MatcherConfig::default();
        assert!(looks_like_entity(&["PETRO", "HOLDINGS", "GROUP"], &cfg));
        assert!(looks_like_entity(&["BANCO", "DEL", "SUR"], &cfg));
        assert!(!looks_like_entity(&["GUSTAVO", "PETRO"], &cfg));
        assert!(!looks_like_entity::<&str>(&[], &cfg));
    }
}
