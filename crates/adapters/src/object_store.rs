// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object store seam: deleting recording chunks once a session is garbage
//! collected (spec §4.C, §6).

use async_trait::async_trait;
use fv_core::Result;

/// The subset of an S3-compatible API the garbage collector needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `HeadBucket` (spec §6): validates the configured bucket exists and is
    /// reachable. Called once at startup; a failure disables GC without
    /// taking the control plane down (spec §4.C).
    async fn head_bucket(&self) -> Result<()>;

    /// List every object key under `prefix` (spec §4.C batches through this
    /// a page at a time; implementations paginate internally).
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Delete a batch of keys in one request where the backend supports it.
    async fn delete_keys(&self, keys: &[String]) -> Result<()>;

    /// Delete every object under `prefix`. Default implementation composes
    /// [`Self::list_keys`] and [`Self::delete_keys`] in fixed-size batches.
    async fn delete_prefix(&self, prefix: &str, batch_size: usize) -> Result<usize> {
        let keys = self.list_keys(prefix).await?;
        let mut deleted = 0;
        for chunk in keys.chunks(batch_size.max(1)) {
            self.delete_keys(chunk).await?;
            deleted += chunk.len();
        }
        Ok(deleted)
    }
}
