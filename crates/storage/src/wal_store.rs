// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable [`SessionStore`] backed by a write-ahead log plus periodic snapshots.

use crate::error::StorageResult;
use crate::snapshot::Snapshot;
use crate::store::SessionStore;
use crate::wal::{Wal, WalEntry};
use fv_core::Session;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

struct Inner {
    sessions: HashMap<String, Session>,
    wal: Wal,
}

/// WAL + snapshot backed store. One instance owns one `(wal_path, snapshot_path)`
/// pair; callers should not run two instances against the same directory.
pub struct WalSessionStore {
    inner: Mutex<Inner>,
    snapshot_path: PathBuf,
}

impl WalSessionStore {
    /// Open (or create) the store rooted at `dir`, replaying any existing
    /// snapshot and WAL tail to reconstruct in-memory state.
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let wal_path = dir.join("sessions.wal");
        let snapshot_path = dir.join("sessions.snapshot.json");

        let mut sessions = HashMap::new();
        if let Some(snap) = Snapshot::load(&snapshot_path)? {
            sessions = snap.sessions;
        }
        for entry in Wal::replay(&wal_path)? {
            match entry {
                WalEntry::Put(s) => {
                    sessions.insert(s.id.as_str().to_string(), s);
                }
                WalEntry::Delete(id) => {
                    sessions.remove(&id);
                }
            }
        }

        let wal = Wal::open(&wal_path)?;
        Ok(Self { inner: Mutex::new(Inner { sessions, wal }), snapshot_path })
    }

    /// Write a fresh snapshot of the current state and truncate the WAL tail,
    /// so a future restart replays from here rather than from the beginning
    /// of time. Called periodically by the scheduler (spec §4.G), not by
    /// every mutation.
    pub fn checkpoint(&self) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        let snap = Snapshot::new(inner.wal.seq(), inner.sessions.clone());
        snap.write(&self.snapshot_path)?;
        inner.wal.truncate()
    }
}

impl SessionStore for WalSessionStore {
    fn put(&self, session: Session) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        inner.wal.append(&WalEntry::Put(session.clone()))?;
        inner.sessions.insert(session.id.as_str().to_string(), session);
        Ok(())
    }

    fn get(&self, id: &str) -> Option<Session> {
        self.inner.lock().sessions.get(id).cloned()
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        let mut inner = self.inner.lock();
        let existed = inner.sessions.remove(id).is_some();
        if existed {
            inner.wal.append(&WalEntry::Delete(id.to_string()))?;
        }
        Ok(existed)
    }

    fn delete_many(&self, ids: &[String]) -> StorageResult<usize> {
        let mut inner = self.inner.lock();
        let mut removed = 0;
        for id in ids {
            if inner.sessions.remove(id).is_some() {
                inner.wal.append(&WalEntry::Delete(id.clone()))?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn list_active(&self) -> Vec<Session> {
        self.inner.lock().sessions.values().filter(|s| s.is_active()).cloned().collect()
    }

    fn list_inactive(&self) -> Vec<Session> {
        self.inner.lock().sessions.values().filter(|s| !s.is_active()).cloned().collect()
    }

    fn list_all(&self) -> Vec<Session> {
        self.inner.lock().sessions.values().cloned().collect()
    }

    fn count_all(&self) -> usize {
        self.inner.lock().sessions.len()
    }
}
