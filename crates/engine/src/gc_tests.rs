// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fv_adapters::FakeObjectStore;

#[tokio::test]
async fn collect_deletes_everything_under_base_id_prefix() {
    let store = Arc::new(FakeObjectStore::new());
    store.seed([
        "abc123/chunks/0001.mp4".to_string(),
        "abc123/chunks/0002.mp4".to_string(),
        "xyz/chunks/0001.mp4".to_string(),
    ]);
    let gc = ChunkGc::new(store.clone(), "chunks", 1000, true);
    let deleted = gc.collect("abc123").await.expect("collect");
    assert_eq!(deleted, 2);
    assert_eq!(store.remaining(), vec!["xyz/chunks/0001.mp4".to_string()]);
}

#[tokio::test]
async fn collect_is_idempotent() {
    let store = Arc::new(FakeObjectStore::new());
    store.seed(["abc123/chunks/0001.mp4".to_string()]);
    let gc = ChunkGc::new(store, "chunks", 1000, true);
    assert_eq!(gc.collect("abc123").await.expect("first"), 1);
    assert_eq!(gc.collect("abc123").await.expect("second"), 0);
}

#[tokio::test]
async fn compound_id_base_extraction_matches_gc_prefix() {
    let store = Arc::new(FakeObjectStore::new());
    store.seed(["abc123/chunks/0001.mp4".to_string()]);
    let gc = ChunkGc::new(store.clone(), "chunks", 1000, true);
    let base = fv_core::base_id("abc123_9999");
    assert_eq!(base, "abc123");
    gc.collect(base).await.expect("collect");
    assert!(store.remaining().is_empty());
}

#[tokio::test]
async fn on_removed_skips_when_disabled() {
    let store = Arc::new(FakeObjectStore::new());
    store.seed(["abc123/chunks/0001.mp4".to_string()]);
    let gc = ChunkGc::new(store.clone(), "chunks", 1000, false);
    gc.disable();
    assert!(!gc.status().enabled);

    let session = fv_core::Session::builder().id("abc123").build();
    gc.on_removed(&session);
    assert_eq!(store.remaining().len(), 1);
}

#[tokio::test]
async fn validate_startup_disables_gc_on_missing_bucket() {
    let store = Arc::new(FakeObjectStore::new());
    store.mark_bucket_missing();
    let gc = ChunkGc::new(store, "chunks", 1000, true);
    assert!(gc.status().enabled);
    gc.validate_startup().await;
    assert!(!gc.status().enabled);
}

#[tokio::test]
async fn validate_startup_leaves_gc_enabled_when_bucket_present() {
    let store = Arc::new(FakeObjectStore::new());
    let gc = ChunkGc::new(store, "chunks", 1000, true);
    gc.validate_startup().await;
    assert!(gc.status().enabled);
}

#[tokio::test]
async fn on_removed_sync_mode_collects_before_returning() {
    let store = Arc::new(FakeObjectStore::new());
    store.seed(["abc123/chunks/0001.mp4".to_string()]);
    let gc = ChunkGc::new(store.clone(), "chunks", 1000, false);
    let session = fv_core::Session::builder().id("abc123").build();
    gc.on_removed(&session);
    assert!(store.remaining().is_empty());
}
