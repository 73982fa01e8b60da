// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chunk Garbage Collector: batched object-store prefix deletion on hard
//! session removal (spec §4.C).

use crate::registry::RemovalHook;
use fv_adapters::ObjectStore;
use fv_core::Session;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Observable GC health, reported by `failover.status` (spec §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcStatus {
    pub enabled: bool,
}

/// Deletes every object under `{baseId}/{chunkFolder}/` when a session is
/// hard-removed. Runs asynchronously (fire-and-forget) by default, or
/// synchronously when `async_mode` is false (operator-driven bulk sweeps,
/// and the test suite).
#[derive(Clone)]
pub struct ChunkGc {
    object_store: Arc<dyn ObjectStore>,
    chunk_folder: String,
    batch_size: usize,
    async_mode: bool,
    enabled: Arc<AtomicBool>,
}

impl ChunkGc {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        chunk_folder: impl Into<String>,
        batch_size: usize,
        async_mode: bool,
    ) -> Self {
        Self {
            object_store,
            chunk_folder: chunk_folder.into(),
            batch_size,
            async_mode,
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Object-store unavailability at startup disables GC without taking the
    /// control plane down (spec §4.C: "a missing bucket is fatal to GC
    /// initialization only").
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        tracing::warn!("chunk gc disabled: object store unavailable at startup");
    }

    /// `HeadBucket` the configured bucket once at startup; disables GC rather
    /// than failing control-plane bootstrap if it's missing or unreachable.
    pub async fn validate_startup(&self) {
        if let Err(e) = self.object_store.head_bucket().await {
            tracing::warn!(error = %e, "chunk gc bucket check failed at startup");
            self.disable();
        }
    }

    pub fn status(&self) -> GcStatus {
        GcStatus { enabled: self.enabled.load(Ordering::SeqCst) }
    }

    /// Delete every object under the session's base-id chunk prefix, then
    /// attempt to remove the prefix marker itself (tolerating "not found").
    /// Idempotent: running it twice against an already-empty prefix yields
    /// the same (empty) final state (P4).
    pub async fn collect(&self, base_id: &str) -> fv_core::Result<usize> {
        let prefix = format!("{base_id}/{}/", self.chunk_folder);
        let deleted = self
            .object_store
            .delete_prefix(&prefix, self.batch_size)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, prefix, "chunk gc batch delete failed");
                e
            })?;
        let marker = prefix.trim_end_matches('/').to_string();
        let _ = self.object_store.delete_keys(&[marker]).await;
        Ok(deleted)
    }

    fn dispatch(&self, base_id: String) {
        let gc = self.clone();
        let run = async move {
            if let Err(e) = gc.collect(&base_id).await {
                tracing::warn!(error = %e, base_id, "chunk gc failed");
            }
        };
        if self.async_mode {
            tokio::spawn(run);
        } else {
            let handle = tokio::runtime::Handle::current();
            tokio::task::block_in_place(|| handle.block_on(run));
        }
    }
}

impl RemovalHook for ChunkGc {
    fn on_removed(&self, session: &Session) {
        if !self.status().enabled {
            return;
        }
        self.dispatch(session.base_id().to_string());
    }
}

#[cfg(test)]
#[path = "gc_tests.rs"]
mod tests;
