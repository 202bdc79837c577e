//! Integration tests for the version store.
//!
//! Runs the store against the in-memory backend and checks history capping,
//! deduplication, rollback and delete behavior.

use std::sync::Arc;

use surgebox_core::versioning::{version_key, KEY_CURRENT, KEY_VERSIONS};
use surgebox_core::{sha256_hex, InMemoryKvStore, KvStore, SurgeError, VersionEntry, VersionStore};

fn setup() -> (Arc<InMemoryKvStore>, VersionStore) {
    let kv = Arc::new(InMemoryKvStore::new());
    let store = VersionStore::new(kv.clone());
    (kv, store)
}

fn hashes(versions: &[VersionEntry]) -> Vec<String> {
    versions.iter().map(|v| v.content_hash.clone()).collect()
}

fn content(i: usize) -> String {
    format!("[General]\n# revision {}\nloglevel = notify\n", i)
}

/// Writing the same content twice leaves a single entry for it.
#[tokio::test]
async fn test_identical_successive_write() {
    let (_kv, store) = setup();

    store.write_current("A").await.unwrap();
    let after_first = store.read_versions().await.unwrap();
    store.write_current("A").await.unwrap();
    let after_second = store.read_versions().await.unwrap();

    assert_eq!(after_first.len(), 1);
    assert_eq!(after_second, after_first);
    assert_eq!(store.read_current().await.unwrap(), "A");
}

/// Seven distinct writes keep the newest five and reclaim the rest.
#[tokio::test]
async fn test_cap_invariant() {
    let (_kv, store) = setup();
    for i in 1..=7 {
        store.write_current(&content(i)).await.unwrap();
    }

    let versions = store.read_versions().await.unwrap();
    let expected: Vec<String> = (3..=7).rev().map(|i| sha256_hex(&content(i))).collect();
    assert_eq!(hashes(&versions), expected);

    for gone in [1, 2] {
        let blob = store
            .read_version_content(&sha256_hex(&content(gone)))
            .await
            .unwrap();
        assert_eq!(blob, None, "C{} should have been reclaimed", gone);
    }
    for kept in 3..=7 {
        let blob = store
            .read_version_content(&sha256_hex(&content(kept)))
            .await
            .unwrap();
        assert_eq!(blob.as_deref(), Some(content(kept).as_str()));
    }
}

/// Current content is always reachable through its own hash.
#[tokio::test]
async fn test_current_blob_survives() {
    let (_kv, store) = setup();
    for i in 1..=7 {
        store.write_current(&content(i)).await.unwrap();
    }
    assert_eq!(store.read_current().await.unwrap(), content(7));
    assert_eq!(
        store
            .read_version_content(&sha256_hex(&content(7)))
            .await
            .unwrap()
            .as_deref(),
        Some(content(7).as_str())
    );

    // Push C7 well past the cap; whatever was written last stays reachable
    for i in 8..=14 {
        store.write_current(&content(i)).await.unwrap();
        let current = store.read_current().await.unwrap();
        assert_eq!(current, content(i));
        let blob = store.read_version_content(&sha256_hex(&current)).await.unwrap();
        assert_eq!(blob.as_deref(), Some(current.as_str()));
    }
    assert_eq!(
        store.read_version_content(&sha256_hex(&content(7))).await.unwrap(),
        None
    );
}

/// Rewriting content that is about to fall off the tail keeps its blob.
#[tokio::test]
async fn test_evicted_entry_matching_new_write_keeps_blob() {
    let (kv, store) = setup();
    for c in ["X", "A", "B", "C", "D"] {
        store.write_current(c).await.unwrap();
    }

    // [X, D, C, B, A, X] is trimmed to five; the tail X is the hash just written
    let outcome = store.write_current("X").await.unwrap();
    assert!(outcome.appended);
    assert!(outcome.reclaimed.is_empty());

    assert_eq!(
        hashes(&store.read_versions().await.unwrap()),
        vec![
            sha256_hex("X"),
            sha256_hex("D"),
            sha256_hex("C"),
            sha256_hex("B"),
            sha256_hex("A")
        ]
    );
    assert!(kv.contains_key(&version_key(&sha256_hex("X"))).await);
    assert_eq!(store.read_current().await.unwrap(), "X");
}

/// Rollback writes the old content as a new head entry.
#[tokio::test]
async fn test_rollback_re_versions() {
    let (_kv, store) = setup();
    for c in ["C1", "C2", "C3"] {
        store.write_current(c).await.unwrap();
    }
    let before = store.read_versions().await.unwrap();

    let outcome = store.rollback_to(&sha256_hex("C1")).await.unwrap();
    assert!(outcome.appended);
    assert_eq!(store.read_current().await.unwrap(), "C1");

    let after = store.read_versions().await.unwrap();
    assert_eq!(
        hashes(&after),
        vec![
            sha256_hex("C1"),
            sha256_hex("C3"),
            sha256_hex("C2"),
            sha256_hex("C1")
        ]
    );
    assert!(after[0].timestamp >= before[0].timestamp);
    assert_eq!(after[0].size, 2);

    // Rolling back to the head again adds nothing
    let outcome = store.rollback_to(&sha256_hex("C1")).await.unwrap();
    assert!(!outcome.appended);
    assert_eq!(store.read_versions().await.unwrap().len(), 4);
}

/// Rollback is capped like any other write.
#[tokio::test]
async fn test_rollback_respects_cap() {
    let (_kv, store) = setup();
    for i in 1..=5 {
        store.write_current(&content(i)).await.unwrap();
    }
    store.rollback_to(&sha256_hex(&content(2))).await.unwrap();

    let versions = store.read_versions().await.unwrap();
    assert_eq!(versions.len(), 5);
    assert_eq!(versions[0].content_hash, sha256_hex(&content(2)));
    assert_eq!(
        store
            .read_version_content(&sha256_hex(&content(1)))
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_rollback_unknown_hash() {
    let (_kv, store) = setup();
    store.write_current("A").await.unwrap();

    let err = store.rollback_to(&sha256_hex("never")).await.unwrap_err();
    assert!(matches!(err, SurgeError::VersionNotFound { .. }));
    assert_eq!(store.read_versions().await.unwrap().len(), 1);
}

/// The live version cannot be deleted.
#[tokio::test]
async fn test_delete_current_forbidden() {
    let (_kv, store) = setup();
    store.write_current("A").await.unwrap();
    store.write_current("B").await.unwrap();
    let before = store.read_versions().await.unwrap();

    let err = store.delete_version(&sha256_hex("B")).await.unwrap_err();
    assert!(matches!(err, SurgeError::CannotDeleteCurrentVersion { .. }));
    assert_eq!(store.read_versions().await.unwrap(), before);
    assert!(store
        .read_version_content(&sha256_hex("B"))
        .await
        .unwrap()
        .is_some());
}

/// Deleting a hash that was never written changes nothing.
#[tokio::test]
async fn test_delete_missing_is_noop() {
    let (_kv, store) = setup();
    store.write_current("A").await.unwrap();
    store.write_current("B").await.unwrap();
    let before = store.read_versions().await.unwrap();

    let removed = store.delete_version(&sha256_hex("never")).await.unwrap();
    assert!(!removed);
    assert_eq!(store.read_versions().await.unwrap(), before);
}

#[tokio::test]
async fn test_delete_old_version() {
    let (kv, store) = setup();
    for c in ["A", "B", "C"] {
        store.write_current(c).await.unwrap();
    }

    assert!(store.delete_version(&sha256_hex("B")).await.unwrap());
    assert_eq!(
        hashes(&store.read_versions().await.unwrap()),
        vec![sha256_hex("C"), sha256_hex("A")]
    );
    assert!(!kv.contains_key(&version_key(&sha256_hex("B"))).await);
    assert_eq!(store.read_current().await.unwrap(), "C");
}

/// Deleting the empty document's hash is refused even before any write.
#[tokio::test]
async fn test_delete_hash_of_empty_document() {
    let (_kv, store) = setup();
    let err = store.delete_version(&sha256_hex("")).await.unwrap_err();
    assert!(matches!(err, SurgeError::CannotDeleteCurrentVersion { .. }));
}

/// Content round-trips byte for byte, including non-ASCII text.
#[tokio::test]
async fn test_round_trip_non_ascii() {
    let (_kv, store) = setup();
    let text = "[Proxy]\n🇯🇵 东京 = ss, 1.2.3.4, 443\nemoji = \"é ü ß\"\r\n\ttab\n";

    let outcome = store.write_current(text).await.unwrap();
    assert_eq!(outcome.hash, sha256_hex(text));
    assert_eq!(sha256_hex(text), sha256_hex(text));

    let blob = store.read_version_content(&outcome.hash).await.unwrap().unwrap();
    assert_eq!(blob.as_bytes(), text.as_bytes());

    let versions = store.read_versions().await.unwrap();
    assert_eq!(versions[0].size, text.len() as u64);
}

/// A failed list write leaves the document and blob in place; retrying
/// records the entry.
#[tokio::test]
async fn test_partial_failure_then_retry() {
    let (kv, store) = setup();
    store.write_current("A").await.unwrap();

    kv.fail_writes_to(KEY_VERSIONS).await;
    let err = store.write_current("B").await.unwrap_err();
    assert!(err.is_backend());

    assert_eq!(store.read_current().await.unwrap(), "B");
    assert!(store
        .read_version_content(&sha256_hex("B"))
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        hashes(&store.read_versions().await.unwrap()),
        vec![sha256_hex("A")]
    );

    kv.clear_failures().await;
    store.write_current("B").await.unwrap();
    assert_eq!(
        hashes(&store.read_versions().await.unwrap()),
        vec![sha256_hex("B"), sha256_hex("A")]
    );
}

/// A failed document write aborts before any list change.
#[tokio::test]
async fn test_document_write_failure() {
    let (kv, store) = setup();
    store.write_current("A").await.unwrap();

    kv.fail_writes_to(KEY_CURRENT).await;
    assert!(store.write_current("B").await.unwrap_err().is_backend());
    assert_eq!(store.read_current().await.unwrap(), "A");
    assert_eq!(store.read_versions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_backend_offline() {
    let (kv, store) = setup();
    store.write_current("A").await.unwrap();
    kv.set_offline(true);

    assert!(store.read_current().await.unwrap_err().is_backend());
    assert!(store.snapshot().await.unwrap_err().is_backend());
    assert!(store.write_current("B").await.unwrap_err().is_backend());

    kv.set_offline(false);
    assert_eq!(store.read_current().await.unwrap(), "A");
}

/// Concurrent writers both persist their content; only list bookkeeping may
/// lose an entry.
#[tokio::test]
async fn test_concurrent_writers_keep_blobs() {
    let (_kv, store) = setup();
    let (a, b) = tokio::join!(store.write_current("A"), store.write_current("B"));
    a.unwrap();
    b.unwrap();

    let current = store.read_current().await.unwrap();
    assert!(current == "A" || current == "B");
    for c in ["A", "B"] {
        assert!(store.read_version_content(&sha256_hex(c)).await.unwrap().is_some());
    }
    let len = store.read_versions().await.unwrap().len();
    assert!((1..=2).contains(&len));
}

/// Lists written by earlier deployments are read as-is.
#[tokio::test]
async fn test_reads_existing_layout() {
    let (kv, store) = setup();
    let hash = sha256_hex("legacy");
    kv.set(KEY_CURRENT, "legacy").await.unwrap();
    kv.set(&version_key(&hash), "legacy").await.unwrap();
    kv.set(
        KEY_VERSIONS,
        &format!(
            r#"[{{"ts":"2024-05-01T10:00:00.000Z","sha256":"{}","size":6}}]"#,
            hash
        ),
    )
    .await
    .unwrap();

    let snap = store.snapshot().await.unwrap();
    assert_eq!(snap.content, "legacy");
    assert_eq!(snap.current_hash, hash);
    assert_eq!(snap.versions.len(), 1);
    assert_eq!(snap.versions[0].timestamp, "2024-05-01T10:00:00.000Z");

    store.write_current("legacy").await.unwrap();
    assert_eq!(store.read_versions().await.unwrap().len(), 1);
}
