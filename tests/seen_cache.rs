use std::fs;

use chrono::{TimeZone, Utc};
use phd_watch::cache::{CacheError, SeenCache};
use phd_watch::posting::Posting;
use serde_json::Value;
use tempfile::tempdir;

fn make_posting(title: &str, url: &str) -> Posting {
    Posting::new(title, "LAAS-CNRS", url)
}

#[test]
fn missing_file_is_an_empty_cache() {
    let dir = tempdir().unwrap();
    let cache = SeenCache::load(dir.path().join("offres_vues.json")).unwrap();

    assert!(cache.is_empty());
    assert_eq!(cache.entries().len(), 0);
}

#[test]
fn corrupt_file_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("offres_vues.json");
    fs::write(&path, "{ not json").unwrap();

    match SeenCache::load(&path) {
        Err(CacheError::Corrupt { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected corrupt cache error, got {other:?}"),
    }
}

#[test]
fn wrong_shape_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("offres_vues.json");
    fs::write(&path, r#"{"hash": "abc"}"#).unwrap();

    assert!(matches!(SeenCache::load(&path), Err(CacheError::Corrupt { .. })));
}

#[test]
fn unreadable_path_is_fatal() {
    let dir = tempdir().unwrap();
    // a directory cannot be read as a file
    let result = SeenCache::load(dir.path());

    assert!(matches!(result, Err(CacheError::Io { .. })));
}

#[test]
fn record_is_idempotent() {
    let dir = tempdir().unwrap();
    let mut cache = SeenCache::empty(dir.path().join("c.json"));
    let posting = make_posting("Thèse A", "https://www.laas.fr/a");

    assert!(cache.is_new(&posting));
    assert!(cache.record(&posting));
    assert!(!cache.is_new(&posting));
    assert!(!cache.record(&posting));
    assert_eq!(cache.len(), 1);
}

#[test]
fn description_change_is_not_new() {
    let dir = tempdir().unwrap();
    let mut cache = SeenCache::empty(dir.path().join("c.json"));
    let posting = make_posting("Thèse A", "https://www.laas.fr/a");
    cache.record(&posting);

    let mut edited = posting.clone();
    edited.description = "updated text".into();

    assert!(!cache.is_new(&edited));
}

#[test]
fn save_then_load_preserves_discovery_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("offres_vues.json");

    let mut cache = SeenCache::empty(&path);
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    for (i, title) in ["C", "A", "B"].iter().enumerate() {
        let posting = make_posting(title, &format!("https://www.laas.fr/{title}"));
        cache.record_at(&posting, t0 + chrono::Duration::minutes(i as i64));
    }
    cache.save().unwrap();

    let reloaded = SeenCache::load(&path).unwrap();
    let titles: Vec<&str> = reloaded.entries().iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["C", "A", "B"]);
    assert_eq!(reloaded.entries(), cache.entries());
    assert!(!reloaded.is_new(&make_posting("A", "https://www.laas.fr/A")));
}

#[test]
fn golden_persisted_field_names() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("offres_vues.json");

    let mut cache = SeenCache::empty(&path);
    let posting = make_posting("Thèse en automatique", "https://www.laas.fr/x");
    let seen_at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap();
    cache.record_at(&posting, seen_at);
    cache.save().unwrap();

    let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let entries = raw.as_array().expect("top-level array");
    assert_eq!(entries.len(), 1);

    let entry = entries[0].as_object().unwrap();
    let mut keys: Vec<&str> = entry.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["date_vue", "hash", "titre"]);
    assert_eq!(entry["hash"], posting.id().as_str());
    assert_eq!(entry["titre"], "Thèse en automatique");
    assert_eq!(entry["date_vue"], "2024-03-01T10:15:30Z");
}

#[test]
fn legacy_naive_timestamps_are_read_as_utc() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("offres_vues.json");
    fs::write(
        &path,
        r#"[{"hash": "abc123", "date_vue": "2024-03-01T10:15:30.123456", "titre": "Ancienne offre"}]"#,
    )
    .unwrap();

    let cache = SeenCache::load(&path).unwrap();
    let entry = &cache.entries()[0];

    assert_eq!(entry.title, "Ancienne offre");
    assert_eq!(entry.hash.as_str(), "abc123");
    assert_eq!(
        entry.first_seen,
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap()
            + chrono::Duration::microseconds(123456)
    );
}

#[test]
fn save_overwrites_and_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("offres_vues.json");
    fs::write(&path, "[]").unwrap();

    let mut cache = SeenCache::load(&path).unwrap();
    cache.record(&make_posting("Thèse", "https://www.laas.fr/t"));
    cache.save().unwrap();

    assert_eq!(SeenCache::load(&path).unwrap().len(), 1);
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|name| name != "offres_vues.json")
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}
