// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Registry: CRUD and state transitions over session entities
//! (spec §4.B). This is the only component that mutates [`Session`] records.

use fv_core::{Clock, Error, Result, Session, SessionId, SessionStatus};
use fv_storage::SessionStore;
use std::sync::Arc;
use std::time::Duration;

/// Callback the registry invokes after a hard `remove`, so the garbage
/// collector can be triggered without the registry depending on GC directly.
pub trait RemovalHook: Send + Sync {
    fn on_removed(&self, session: &Session);
}

impl<F: Fn(&Session) + Send + Sync> RemovalHook for F {
    fn on_removed(&self, session: &Session) {
        self(session)
    }
}

pub struct Registry<C: Clock> {
    store: Arc<dyn SessionStore>,
    clock: C,
    on_removed: Option<Arc<dyn RemovalHook>>,
}

impl<C: Clock> Registry<C> {
    pub fn new(store: Arc<dyn SessionStore>, clock: C) -> Self {
        Self { store, clock, on_removed: None }
    }

    pub fn with_removal_hook(mut self, hook: Arc<dyn RemovalHook>) -> Self {
        self.on_removed = Some(hook);
        self
    }

    /// `register(id, clientId, clientHost, metadata?)` (spec §4.B).
    pub fn register(
        &self,
        id: impl Into<SessionId>,
        client_id: impl Into<String>,
        client_host: Option<String>,
        metadata: impl Into<String>,
    ) -> Result<Session> {
        let id = id.into();
        if self.store.exists(id.as_str()) {
            return Err(Error::AlreadyExists(id.0));
        }
        let now = self.clock.epoch_ms();
        let session = Session::new(id, client_id, client_host, metadata, now);
        self.store.put(session.clone())?;
        Ok(session)
    }

    /// `heartbeat(id, lastChunk?)`: touches `lastHeartbeat`, optionally overwrites `lastChunk`.
    pub fn heartbeat(&self, id: &str, last_chunk: Option<String>) -> Result<Session> {
        let mut session = self.require(id)?;
        session.last_heartbeat_ms = self.clock.epoch_ms();
        if let Some(chunk) = last_chunk {
            session.last_chunk = Some(chunk);
        }
        self.store.put(session.clone())?;
        Ok(session)
    }

    /// `setStatus(id, status)`: overwrites status, touches heartbeat, applies I2.
    pub fn set_status(&self, id: &str, status: SessionStatus) -> Result<Session> {
        let mut session = self.require(id)?;
        session.set_status(status, self.clock.epoch_ms());
        self.store.put(session.clone())?;
        Ok(session)
    }

    /// `setRecordingPath(id, path)`.
    pub fn set_recording_path(&self, id: &str, path: impl Into<String>) -> Result<Session> {
        let mut session = self.require(id)?;
        session.recording_path = Some(path.into());
        session.last_heartbeat_ms = self.clock.epoch_ms();
        self.store.put(session.clone())?;
        Ok(session)
    }

    /// `stop(id)`: two-phase STOPPING then COMPLETED.
    pub fn stop(&self, id: &str) -> Result<Session> {
        self.set_status(id, SessionStatus::Stopping)?;
        self.set_status(id, SessionStatus::Completed)
    }

    /// `markInactive(id)`: active=false, status=INACTIVE; does not trigger GC.
    pub fn mark_inactive(&self, id: &str) -> Result<Session> {
        self.set_status(id, SessionStatus::Inactive)
    }

    /// Write a backup container id/name directly, bypassing higher-level ops
    /// (spec §4.E step 7: "metadata-only write").
    pub fn set_backup_container(
        &self,
        id: &str,
        container_id: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Result<Session> {
        let mut session = self.require(id)?;
        session.backup_container_id = Some(container_id.into());
        session.backup_container_name = Some(container_name.into());
        self.store.put(session.clone())?;
        Ok(session)
    }

    /// Clear the backup container reference (Launcher stop algorithm, spec §4.E).
    pub fn clear_backup_container(&self, id: &str) -> Result<Session> {
        let mut session = self.require(id)?;
        session.backup_container_id = None;
        session.backup_container_name = None;
        self.store.put(session.clone())?;
        Ok(session)
    }

    /// `remove(id)`: hard delete; triggers GC fire-and-forget before returning.
    pub fn remove(&self, id: &str) -> Result<()> {
        let session = self.require(id)?;
        self.store.delete(id)?;
        if let Some(hook) = &self.on_removed {
            hook.on_removed(&session);
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.store.get(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.store.exists(id)
    }

    pub fn list_active(&self) -> Vec<Session> {
        self.store.list_active()
    }

    /// The inactive-set index (spec §4.A): every session with `active==false`,
    /// not a time-based staleness query. See [`Registry::sweep_inactive`] for
    /// the CLEANUP job's separate `isInactive(T)` filter.
    pub fn list_inactive(&self) -> Vec<Session> {
        self.store.list_inactive()
    }

    pub fn list_all(&self) -> Vec<Session> {
        self.store.list_all()
    }

    /// Scheduler `CLEANUP` job body (spec §4.G): `listActive` → filter
    /// `isInactive(maxInactive)` → `setStatus(INACTIVE)` then `remove` each,
    /// then `Store.sweepOrphans()`. Returns the ids that were swept.
    pub fn sweep_inactive(&self, max_inactive: Duration) -> Result<Vec<String>> {
        let now = self.clock.epoch_ms();
        let stale: Vec<String> = self
            .list_active()
            .into_iter()
            .filter(|s| s.is_inactive(now, max_inactive))
            .map(|s| s.id.as_str().to_string())
            .collect();

        let mut swept = Vec::with_capacity(stale.len());
        for id in &stale {
            if self.set_status(id, SessionStatus::Inactive).is_ok() && self.remove(id).is_ok() {
                swept.push(id.clone());
            }
        }
        let _ = self.store.sweep_orphans();
        Ok(swept)
    }

    pub fn count_active(&self) -> usize {
        self.store.count_active()
    }

    pub fn count_inactive(&self) -> usize {
        self.store.count_inactive()
    }

    pub fn count_all(&self) -> usize {
        self.store.count_all()
    }

    fn require(&self, id: &str) -> Result<Session> {
        self.store.get(id).ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
