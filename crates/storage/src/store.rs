// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable session store contract (spec §4.A).

use crate::error::StorageResult;
use fv_core::Session;

/// Source of truth for session records.
///
/// All methods are synchronous: the backing implementation guards an
/// in-memory map with a mutex and does its own (fast, local) file IO, so
/// there is no need to hop through an async runtime for registry reads.
pub trait SessionStore: Send + Sync {
    /// Insert or overwrite a session record (I3: `register` is an atomic upsert).
    fn put(&self, session: Session) -> StorageResult<()>;

    fn get(&self, id: &str) -> Option<Session>;

    fn exists(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Remove a session record. Returns whether it was present.
    fn delete(&self, id: &str) -> StorageResult<bool>;

    /// Remove several session records in one durable batch, returning the count removed.
    fn delete_many(&self, ids: &[String]) -> StorageResult<usize>;

    /// The active-set index: sessions with `isActive() == true` (spec §3).
    fn list_active(&self) -> Vec<Session>;

    /// The inactive-set index: sessions with `isActive() == false` (spec §3,
    /// I2). This is the membership complement of [`SessionStore::list_active`],
    /// not a time-based staleness query — a `PAUSED`/`COMPLETED` session with
    /// a fresh heartbeat belongs here too. The CLEANUP sweep's time-based
    /// `isInactive(T)` predicate is a separate filter the Registry applies
    /// on top of `list_active`, not this index.
    fn list_inactive(&self) -> Vec<Session>;

    fn list_all(&self) -> Vec<Session>;

    fn count_active(&self) -> usize {
        self.list_active().len()
    }

    /// Size of the inactive-set index (spec §4.A `countInactive()`).
    fn count_inactive(&self) -> usize {
        self.list_inactive().len()
    }

    fn count_all(&self) -> usize;

    /// Removes index entries whose referenced records no longer exist
    /// (spec §4.A). This implementation keeps no index separate from the
    /// record map itself, so there is nothing to reconcile; kept as a
    /// callable no-op so the Scheduler's cleanup job has a stable target.
    fn sweep_orphans(&self) -> StorageResult<usize> {
        Ok(0)
    }
}
