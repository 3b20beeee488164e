//! Behavioural tests for the read-through and invalidation wrappers,
//! driven through the public cache API against the in-memory backend.

use folio_core::FolioError;
use folio_service::cache::{
    build_key, Call, CacheHandle, InMemoryCacheBackend, Invalidate, ReadThrough,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const PREFIX: &str = "book_service";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Shelf {
    owner: String,
    titles: Vec<String>,
}

fn shelf() -> Shelf {
    Shelf {
        owner: "reader".to_string(),
        titles: vec!["Dune".to_string(), "Kindred".to_string()],
    }
}

fn connected() -> (Arc<InMemoryCacheBackend>, CacheHandle) {
    let backend = Arc::new(InMemoryCacheBackend::new());
    let handle = CacheHandle::Connected(backend.clone());
    (backend, handle)
}

#[test]
fn test_keys_are_deterministic() {
    let first = Call::new("search").arg(5).named("title", "dune").named("author", "herbert");
    let second = Call::new("search").arg(5).named("author", "herbert").named("title", "dune");

    let key = build_key(PREFIX, &first);
    assert_eq!(key, build_key(PREFIX, &second));
    assert_eq!(key, build_key(PREFIX, &first.clone()));
    assert_eq!(key, "book_service:search:5:author:herbert:title:dune");
}

#[test]
fn test_long_keys_have_fixed_short_form() {
    let call = Call::new("search").arg("x".repeat(250));
    let key = build_key(PREFIX, &call);

    let hash = key
        .strip_prefix("book_service:search:hash:")
        .expect("hashed form");
    assert_eq!(hash.len(), 32);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_hit_skips_operation() {
    let (backend, cache) = connected();
    let read = ReadThrough::new(PREFIX, 300);
    let call = Call::new("get_shelf").arg("reader");
    backend.insert(
        read.key_for(&call),
        serde_json::to_string(&shelf()).unwrap(),
        Duration::from_secs(300),
    );

    let calls = AtomicUsize::new(0);
    let result: Result<Shelf, FolioError> = read
        .run(&cache, call, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Shelf {
                owner: "someone else".to_string(),
                titles: vec![],
            })
        })
        .await;

    assert_eq!(result.unwrap(), shelf());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_miss_populates_with_ttl() {
    let (backend, cache) = connected();
    let read = ReadThrough::new(PREFIX, 600);

    let result: Result<Shelf, FolioError> = read
        .run(&cache, Call::new("get_shelf").arg("reader"), || async { Ok(shelf()) })
        .await;
    assert_eq!(result.unwrap(), shelf());

    let key = "book_service:get_shelf:reader";
    let stored: Shelf = serde_json::from_str(&backend.raw(key).unwrap()).unwrap();
    assert_eq!(stored, shelf());
    assert_eq!(backend.ttl(key), Some(Duration::from_secs(600)));

    tokio::time::advance(Duration::from_secs(601)).await;
    assert!(!backend.contains(key));
}

#[tokio::test]
async fn test_null_results_are_not_cached() {
    let (backend, cache) = connected();
    let calls = AtomicUsize::new(0);

    for _ in 0..2 {
        let result: Result<Option<Shelf>, FolioError> = ReadThrough::new(PREFIX, 300)
            .run(&cache, Call::new("get_shelf").arg("nobody"), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })
            .await;
        assert_eq!(result.unwrap(), None);
    }

    assert!(backend.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failing_backend_degrades_to_direct_calls() {
    let (backend, cache) = connected();
    backend.set_failing(true);
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
        let read: Result<Shelf, FolioError> = ReadThrough::new(PREFIX, 300)
            .run(&cache, Call::new("get_shelf").arg("reader"), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(shelf())
            })
            .await;
        assert_eq!(read.unwrap(), shelf());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let written: Result<u32, FolioError> = Invalidate::pattern(PREFIX, "get_shelf:*")
        .run(&cache, Call::new("add_to_shelf").arg("reader"), || async { Ok(7) })
        .await;
    assert_eq!(written.unwrap(), 7);
}

#[tokio::test]
async fn test_default_invalidation_removes_only_matching_key() {
    let (backend, cache) = connected();
    let read_key = ReadThrough::new(PREFIX, 300).key_for(&Call::new("rename").arg("a").arg("b"));
    backend.insert(read_key.as_str(), "1", Duration::from_secs(60));
    backend.insert("book_service:rename:a:c", "2", Duration::from_secs(60));
    backend.insert("book_service:get_shelf:a", "3", Duration::from_secs(60));

    let result: Result<&str, FolioError> = Invalidate::new(PREFIX)
        .run(&cache, Call::new("rename").arg("a").arg("b"), || async { Ok("renamed") })
        .await;

    assert_eq!(result.unwrap(), "renamed");
    assert!(!backend.contains(&read_key));
    assert_eq!(backend.len(), 2);
}

#[tokio::test]
async fn test_wildcard_invalidation() {
    let (backend, cache) = connected();
    for key in ["user_1", "user_2", "user_3:extra", "book_1"] {
        backend.insert(format!("{}:{}", PREFIX, key), "x", Duration::from_secs(60));
    }

    let result: Result<(), FolioError> = Invalidate::pattern(PREFIX, "user_*")
        .with_scan_batch_size(2)
        .run(&cache, Call::new("purge_users"), || async { Ok(()) })
        .await;

    assert!(result.is_ok());
    assert_eq!(backend.keys(), vec!["book_service:book_1".to_string()]);
}

#[tokio::test]
async fn test_mutation_result_survives_failed_invalidation() {
    let (backend, cache) = connected();
    backend.set_failing(true);

    for invalidate in [
        Invalidate::new(PREFIX),
        Invalidate::pattern(PREFIX, "get_*"),
        Invalidate::pattern(PREFIX, "get_shelf:reader"),
        Invalidate::resolver(PREFIX, |_, _| "book_service:anything".to_string().into()),
    ] {
        let result: Result<Shelf, FolioError> = invalidate
            .run(&cache, Call::new("update_shelf").arg("reader"), || async { Ok(shelf()) })
            .await;
        assert_eq!(result.unwrap(), shelf());
    }
}

#[tokio::test]
async fn test_domain_errors_propagate_unchanged() {
    let (backend, cache) = connected();
    backend.insert("book_service:get_shelf:x", "{}", Duration::from_secs(60));

    let read: Result<Shelf, FolioError> = ReadThrough::new(PREFIX, 300)
        .run(&cache, Call::new("get_shelf").arg("missing"), || async {
            Err(FolioError::not_found("Shelf", "missing"))
        })
        .await;
    let err = read.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    assert_eq!(err.to_string(), FolioError::not_found("Shelf", "missing").to_string());

    let write: Result<Shelf, FolioError> = Invalidate::pattern(PREFIX, "get_shelf:*")
        .run(&cache, Call::new("update_shelf").arg("x"), || async {
            Err(FolioError::conflict("Title already on shelf"))
        })
        .await;
    let err = write.unwrap_err();
    assert!(matches!(&err, FolioError::Conflict(message) if message == "Title already on shelf"));
    assert!(backend.contains("book_service:get_shelf:x"));
}
