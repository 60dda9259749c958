//! Integration tests for the cache entry lifecycle
//!
//! Exercises set/get/clear through the public API the way a caller memoizing
//! an HTTP response would.

use std::fs;
use std::thread;
use std::time::Duration;

use jsoncache::cache::{CacheStore, ErrorKind, Lookup, Status};
use jsoncache::config::CacheConfig;
use tempfile::TempDir;

fn create_test_cache() -> (CacheStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache = CacheStore::with_dir(temp_dir.path().to_path_buf());
    (cache, temp_dir)
}

#[test]
fn test_roundtrip_preserves_payload_bytes() {
    let (cache, _temp_dir) = create_test_cache();
    let payloads: [&[u8]; 4] = [
        br#"{"temp":21.5,"unit":"C"}"#,
        b"",
        "\"quoted\" \\ back\\slash\nnewline \u{1F30A}".as_bytes(),
        b"[null,true,false]",
    ];

    for (i, payload) in payloads.iter().enumerate() {
        let key = format!("entry_{}", i);
        cache.set(&key, payload, "1h").expect("Set should succeed");

        let lookup = cache.get(&key).expect("Get should succeed");
        assert!(lookup.is_found());
        assert_eq!(lookup.data().map(Vec::as_slice), Some(*payload));
    }
}

#[test]
fn test_expired_entry_stays_on_disk() {
    let (cache, temp_dir) = create_test_cache();

    cache.set("short", b"{}", "1ms").expect("Set should succeed");
    thread::sleep(Duration::from_millis(10));

    let lookup = cache.get("short").expect("Expiry is not an error");
    assert!(matches!(lookup, Lookup::Expired { .. }));
    assert!(!lookup.is_found());
    assert!(temp_dir.path().join("short.json").exists());
}

#[test]
fn test_miss_and_expired_are_distinguishable() {
    let (cache, _temp_dir) = create_test_cache();
    cache.set("short", b"{}", "1ms").expect("Set should succeed");
    thread::sleep(Duration::from_millis(10));

    let miss = cache.get("never_set").unwrap_err();
    let expired = cache.get("short").expect("Expiry is not an error");

    assert_eq!(miss.kind(), ErrorKind::Miss);
    assert!(!miss.is_fatal());
    assert!(expired.is_expired());

    let miss_status = Status::from_error(&miss);
    let expired_status = Status::from_lookup("short", &expired);
    assert!(!miss_status.fatal);
    assert!(!expired_status.fatal);
    assert_ne!(miss_status.message, expired_status.message);
}

#[test]
fn test_clear_is_idempotent() {
    let (cache, temp_dir) = create_test_cache();

    assert!(!cache.clear("never_set").expect("Clearing a missing key succeeds"));

    cache.set("k", b"1", "1h").expect("Set should succeed");
    assert!(cache.clear("k").expect("Clear should succeed"));
    assert!(!temp_dir.path().join("k.json").exists());

    let err = cache.get("k").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Miss);
}

#[test]
fn test_disabled_store_never_touches_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache = CacheStore::with_dir(temp_dir.path().join("cache")).disabled(true);

    cache.set("k", b"1", "1h").expect("Disabled set succeeds");
    cache.set("k", b"1", "not a duration").expect("Disabled set never fails");
    assert!(!temp_dir.path().join("cache").exists());

    let lookup = cache.get("k").expect("Disabled get succeeds");
    assert_eq!(lookup, Lookup::Disabled);
    assert!(!lookup.is_found());

    assert!(!cache.clear("k").expect("Disabled clear succeeds"));
}

#[test]
fn test_disabled_store_leaves_existing_entries_alone() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let enabled = CacheStore::with_dir(temp_dir.path().to_path_buf());
    enabled.set("k", b"1", "1h").expect("Set should succeed");

    let disabled = enabled.clone().disabled(true);
    disabled.clear("k").expect("Disabled clear succeeds");

    assert!(temp_dir.path().join("k.json").exists());
}

#[test]
fn test_set_bootstraps_missing_directories() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let nested = temp_dir.path().join("nested").join("cache").join("dir");
    let cache = CacheStore::with_dir(nested.clone());

    cache.set("k", b"1", "1h").expect("Set should succeed");

    assert!(nested.is_dir(), "Nested directory should be created");
    assert!(nested.join("k.json").exists(), "Cache file should exist");
}

#[test]
fn test_corrupt_entry_is_parse_failure() {
    let (cache, temp_dir) = create_test_cache();
    fs::write(cache.cache_filepath("corrupt"), [0x00, 0xff, b'{', b'x']).unwrap();

    let err = cache.get("corrupt").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.is_fatal());
    let help = err.help().expect("Parse errors carry a hint");
    assert!(help.contains(temp_dir.path().to_str().unwrap()));
}

#[test]
fn test_from_config_honours_disabled_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = CacheConfig {
        dir: temp_dir.path().to_string_lossy().into_owned(),
        disabled: true,
        fallback_dir_name: "unused".to_string(),
    };

    let cache = CacheStore::from_config(&config);

    assert_eq!(cache.dir(), temp_dir.path());
    assert!(cache.is_disabled());
}

#[test]
fn test_memoize_skips_fetch_while_fresh() {
    let (cache, _temp_dir) = create_test_cache();
    let ttl = chrono::Duration::hours(1);

    let first: Result<Vec<u8>, std::io::Error> =
        cache.memoize("api_call", ttl, || Ok(br#"{"n":1}"#.to_vec()));
    let second: Result<Vec<u8>, std::io::Error> = cache.memoize("api_call", ttl, || {
        panic!("fetch must not run while the entry is fresh")
    });

    assert_eq!(first.unwrap(), second.unwrap());
}

#[test]
fn test_memoize_refetches_after_expiry() {
    let (cache, _temp_dir) = create_test_cache();

    let _: Result<Vec<u8>, ()> =
        cache.memoize("api_call", chrono::Duration::milliseconds(1), || Ok(b"old".to_vec()));
    thread::sleep(Duration::from_millis(10));
    let fresh: Result<Vec<u8>, ()> =
        cache.memoize("api_call", chrono::Duration::hours(1), || Ok(b"new".to_vec()));

    assert_eq!(fresh.unwrap(), b"new".to_vec());
}
