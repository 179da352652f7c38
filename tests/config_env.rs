// tests/config_env.rs
use std::{env, fs};

use watchlist_screener::config::{
    MatcherConfig, ENV_MATCHER_CONFIG_PATH, ENV_MATCHER_MIN_SCORE, ENV_MATCHER_SEARCH_MIN_SCORE,
};
use watchlist_screener::{best_match, NameIndex, ReferenceEntry};

fn clear_env() {
    env::remove_var(ENV_MATCHER_CONFIG_PATH);
    env::remove_var(ENV_MATCHER_MIN_SCORE);
    env::remove_var(ENV_MATCHER_SEARCH_MIN_SCORE);
}

#[serial_test::serial]
#[test]
fn defaults_then_file_then_env() {
    // Isolate CWD so the repo's config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing on disk -> built-in defaults
    let cfg = MatcherConfig::load_default().unwrap();
    assert_eq!(cfg, MatcherConfig::default());

    // 2) ./config/matcher.toml
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/matcher.toml"),
        "[thresholds]\nbest_min_score = 95.0\n",
    )
    .unwrap();
    let cfg = MatcherConfig::load_default().unwrap();
    assert_eq!(cfg.thresholds.best_min_score, 95.0);
    assert_eq!(cfg.thresholds.search_min_score, 80.0);

    // 3) Env thresholds win over the file
    env::set_var(ENV_MATCHER_MIN_SCORE, "85");
    env::set_var(ENV_MATCHER_SEARCH_MIN_SCORE, "500");
    let cfg = MatcherConfig::load_default().unwrap();
    assert_eq!(cfg.thresholds.best_min_score, 85.0);
    assert_eq!(cfg.thresholds.search_min_score, 103.0);

    // 4) Garbage env values are ignored
    env::set_var(ENV_MATCHER_MIN_SCORE, "high");
    env::set_var(ENV_MATCHER_SEARCH_MIN_SCORE, "NaN");
    let cfg = MatcherConfig::load_default().unwrap();
    assert_eq!(cfg.thresholds.best_min_score, 95.0);
    assert_eq!(cfg.thresholds.search_min_score, 80.0);

    // 5) Explicit path that does not exist is an error
    env::set_var(ENV_MATCHER_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(MatcherConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(old).unwrap();
}

#[serial_test::serial]
#[test]
fn config_from_file_drives_index_behavior() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("strict.toml");
    fs::write(
        &p,
        r#"
[tokens]
min_query_tokens = 3

[lexicon]
entity_markers = ["consortium"]
"#,
    )
    .unwrap();

    let cfg = MatcherConfig::from_path(&p).unwrap();
    assert!(cfg.is_entity_marker("CONSORTIUM"));
    assert!(!cfg.is_entity_marker("BANK"));

    let idx = NameIndex::build_with(
        vec![ReferenceEntry::new("1", "PETRO URREGO, GUSTAVO FRANCISCO")],
        cfg,
    );
    // Two-token queries are now ambiguous.
    assert!(best_match("Gustavo Petro", &idx, 0.0).is_none());
    assert!(best_match("Gustavo Francisco Petro", &idx, 90.0).is_some());
}

#[serial_test::serial]
#[test]
fn invalid_values_are_rejected() {
    clear_env();
    assert!(MatcherConfig::from_toml_str("[blocking]\nmax_pool = 0\n").is_err());
    assert!(MatcherConfig::from_toml_str("[scoring]\nratio_weight = -1.0\n").is_err());
    assert!(MatcherConfig::from_toml_str("[thresholds]\nsearch_limit_max = 0\n").is_err());
    assert!(MatcherConfig::from_toml_str("not = [valid").is_err());
}
