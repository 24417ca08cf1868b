//! Tests for the code store itself: generation, uniqueness, lookup,
//! deletion and ordering, without going through HTTP.

use std::collections::HashSet;
use std::sync::Mutex;
use std::thread;

use tempfile::NamedTempFile;

use tinylink::codegen::{CodeGenerator, CODE_LENGTH, MAX_ATTEMPTS};
use tinylink::error::StoreError;
use tinylink::store::CodeStore;

/// Helper function to create a store backed by a temporary database file
fn setup_store() -> (CodeStore, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let store = CodeStore::open(temp_db.path().to_str().unwrap())
        .expect("Failed to initialize test database");
    (store, temp_db)
}

/// Always proposes the same code
struct FixedCode(&'static str);

impl CodeGenerator for FixedCode {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

/// Proposes the given codes in order
struct Scripted(Mutex<std::vec::IntoIter<String>>);

impl Scripted {
    fn new(codes: &[&str]) -> Self {
        let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        Self(Mutex::new(codes.into_iter()))
    }
}

impl CodeGenerator for Scripted {
    fn generate(&self) -> String {
        self.0
            .lock()
            .unwrap()
            .next()
            .expect("scripted generator ran out of codes")
    }
}

#[test]
fn test_shorten_then_resolve_random_code() {
    let (store, _temp_db) = setup_store();

    let code = store.shorten("https://example.com", None).unwrap();

    assert_eq!(code.len(), CODE_LENGTH);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(
        store.resolve(&code).unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[test]
fn test_long_url_is_stored_exactly_as_given() {
    let (store, _temp_db) = setup_store();

    for url in ["https://example.com/x ", "  https://example.com/y", "not even a url\t"] {
        let code = store.shorten(url, None).unwrap();
        assert_eq!(store.resolve(&code).unwrap().as_deref(), Some(url));
    }

    // Control characters are the caller's concern, not the store's.
    store.shorten("https://a.com/\nx", Some("ctl")).unwrap();
    assert_eq!(store.resolve("ctl").unwrap().as_deref(), Some("https://a.com/\nx"));
}

#[test]
fn test_shorten_many_urls_round_trip() {
    let (store, _temp_db) = setup_store();

    let created: Vec<(String, String)> = (0..50)
        .map(|i| {
            let url = format!("https://example.com/page/{}", i);
            let code = store.shorten(&url, None).unwrap();
            (code, url)
        })
        .collect();

    for (code, url) in created {
        assert_eq!(store.resolve(&code).unwrap(), Some(url));
    }
}

#[test]
fn test_custom_code_is_used_verbatim() {
    let (store, _temp_db) = setup_store();

    let code = store.shorten("https://a.com", Some("mylink")).unwrap();

    assert_eq!(code, "mylink");
    assert_eq!(store.resolve("mylink").unwrap().as_deref(), Some("https://a.com"));
}

#[test]
fn test_duplicate_custom_code_is_rejected() {
    let (store, _temp_db) = setup_store();

    store.shorten("https://a.com", Some("mylink")).unwrap();
    let err = store.shorten("https://b.com", Some("mylink")).unwrap_err();

    assert!(matches!(err, StoreError::DuplicateCode(ref code) if code == "mylink"));
    assert_eq!(store.resolve("mylink").unwrap().as_deref(), Some("https://a.com"));
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_empty_custom_code_counts_as_absent() {
    let (store, _temp_db) = setup_store();

    let code = store.shorten("https://example.com", Some("")).unwrap();

    assert_eq!(code.len(), CODE_LENGTH);
}

#[test]
fn test_blank_long_url_is_rejected_before_storing() {
    let (store, _temp_db) = setup_store();

    assert!(matches!(store.shorten("", None), Err(StoreError::EmptyInput)));
    assert!(matches!(
        store.shorten("   ", Some("blank")),
        Err(StoreError::EmptyInput)
    ));
    assert!(store.list().unwrap().is_empty());
    assert_eq!(store.resolve("blank").unwrap(), None);
}

#[test]
fn test_resolve_unknown_code_is_none() {
    let (store, _temp_db) = setup_store();

    assert_eq!(store.resolve("nope42").unwrap(), None);
    assert_eq!(store.get("nope42").unwrap(), None);
}

#[test]
fn test_resolve_is_exact_match() {
    let (store, _temp_db) = setup_store();

    store.shorten("https://example.com", Some("Case")).unwrap();

    assert_eq!(store.resolve("case").unwrap(), None);
    assert_eq!(store.resolve("Cas").unwrap(), None);
    assert!(store.resolve("Case").unwrap().is_some());
}

#[test]
fn test_delete_then_resolve_is_none() {
    let (store, _temp_db) = setup_store();

    store.shorten("https://a.com", Some("mylink")).unwrap();
    store.delete("mylink").unwrap();

    assert_eq!(store.resolve("mylink").unwrap(), None);
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_delete_missing_code_is_noop() {
    let (store, _temp_db) = setup_store();

    store.shorten("https://keep.com", Some("keep")).unwrap();
    store.delete("never-existed").unwrap();

    assert_eq!(store.resolve("never-existed").unwrap(), None);
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_delete_is_idempotent() {
    let (store, _temp_db) = setup_store();

    store.shorten("https://a.com", Some("twice")).unwrap();
    store.shorten("https://b.com", Some("other")).unwrap();

    store.delete("twice").unwrap();
    let after_once = store.list().unwrap();
    store.delete("twice").unwrap();
    let after_twice = store.list().unwrap();

    assert_eq!(after_once, after_twice);
    assert_eq!(store.resolve("twice").unwrap(), None);
}

#[test]
fn test_deleted_code_can_be_claimed_again() {
    let (store, _temp_db) = setup_store();

    store.shorten("https://old.com", Some("reuse")).unwrap();
    store.delete("reuse").unwrap();
    store.shorten("https://new.com", Some("reuse")).unwrap();

    assert_eq!(store.resolve("reuse").unwrap().as_deref(), Some("https://new.com"));
}

#[test]
fn test_list_is_newest_first() {
    let (store, _temp_db) = setup_store();

    let c1 = store.shorten("https://one.com", None).unwrap();
    let c2 = store.shorten("https://two.com", None).unwrap();
    let c3 = store.shorten("https://three.com", None).unwrap();

    let codes: Vec<String> = store
        .list()
        .unwrap()
        .into_iter()
        .map(|mapping| mapping.short_code)
        .collect();

    assert_eq!(codes, vec![c3, c2, c1]);
}

#[test]
fn test_ids_are_never_reused() {
    let (store, _temp_db) = setup_store();

    store.shorten("https://a.com", Some("a")).unwrap();
    store.shorten("https://b.com", Some("b")).unwrap();
    store.delete("b").unwrap();
    store.shorten("https://c.com", Some("c")).unwrap();

    let mappings = store.list().unwrap();
    let ids: Vec<u64> = mappings.iter().map(|m| m.id).collect();

    assert_eq!(ids, vec![3, 1]);
    assert_eq!(mappings[0].short_code, "c");
    assert_eq!(mappings[0].long_url, "https://c.com");
}

#[test]
fn test_random_collision_is_retried() {
    let (store, _temp_db) = setup_store();
    let store = store.with_generator(Scripted::new(&["taken1", "taken1", "taken1", "fresh1"]));

    store.shorten("https://first.com", Some("taken1")).unwrap();
    let code = store.shorten("https://second.com", None).unwrap();

    assert_eq!(code, "fresh1");
    assert_eq!(store.resolve("taken1").unwrap().as_deref(), Some("https://first.com"));
    assert_eq!(store.resolve("fresh1").unwrap().as_deref(), Some("https://second.com"));
}

#[test]
fn test_exhausted_codespace_is_reported() {
    let (store, _temp_db) = setup_store();
    let store = store.with_generator(FixedCode("AAAAAA"));

    assert_eq!(store.shorten("https://first.com", None).unwrap(), "AAAAAA");

    let err = store.shorten("https://second.com", None).unwrap_err();
    assert!(matches!(err, StoreError::ExhaustedCodespace { attempts } if attempts == MAX_ATTEMPTS));

    // Nothing was written by the failed call.
    let mappings = store.list().unwrap();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].long_url, "https://first.com");
}

#[test]
fn test_custom_code_bypasses_generator() {
    let (store, _temp_db) = setup_store();
    let store = store.with_generator(FixedCode("AAAAAA"));

    store.shorten("https://first.com", None).unwrap();
    let code = store.shorten("https://second.com", Some("custom")).unwrap();

    assert_eq!(code, "custom");
}

#[test]
fn test_mappings_survive_reopen() {
    let temp_db = NamedTempFile::new().unwrap();
    let path = temp_db.path().to_str().unwrap();

    let code = {
        let store = CodeStore::open(path).unwrap();
        store.shorten("https://persisted.com", None).unwrap()
    };

    let store = CodeStore::open(path).unwrap();
    assert_eq!(
        store.resolve(&code).unwrap().as_deref(),
        Some("https://persisted.com")
    );

    // The id counter also survives, so new rows still sort after old ones.
    let newer = store.shorten("https://newer.com", None).unwrap();
    assert_eq!(store.list().unwrap()[0].short_code, newer);
}

#[test]
fn test_concurrent_shorten_never_shares_codes() {
    let (store, _temp_db) = setup_store();

    let codes: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = &store;
                scope.spawn(move || {
                    (0..25)
                        .map(|i| {
                            store
                                .shorten(&format!("https://example.com/{}/{}", t, i), None)
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    let unique: HashSet<&String> = codes.iter().collect();
    assert_eq!(unique.len(), 200);

    let stored = store.list().unwrap();
    assert_eq!(stored.len(), 200);
    let stored_codes: HashSet<&str> = stored.iter().map(|m| m.short_code.as_str()).collect();
    assert_eq!(stored_codes.len(), 200);
}

#[test]
fn test_concurrent_same_custom_code_has_one_winner() {
    let (store, _temp_db) = setup_store();

    let results: Vec<Result<String, StoreError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|t| {
                let store = &store;
                scope.spawn(move || store.shorten(&format!("https://racer{}.com", t), Some("contested")))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::DuplicateCode(_))))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(duplicates, 15);

    // The stored target is the winner's, and nothing else was written.
    let stored = store.list().unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].long_url.starts_with("https://racer"));
    assert_eq!(
        store.resolve("contested").unwrap().as_deref(),
        Some(stored[0].long_url.as_str())
    );
}
