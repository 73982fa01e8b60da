// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`SessionStore`] for engine/daemon unit tests — no filesystem.

use crate::error::StorageResult;
use crate::store::SessionStore;
use fv_core::Session;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct FakeSessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl FakeSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for FakeSessionStore {
    fn put(&self, session: Session) -> StorageResult<()> {
        self.sessions.lock().insert(session.id.as_str().to_string(), session);
        Ok(())
    }

    fn get(&self, id: &str) -> Option<Session> {
        self.sessions.lock().get(id).cloned()
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        Ok(self.sessions.lock().remove(id).is_some())
    }

    fn delete_many(&self, ids: &[String]) -> StorageResult<usize> {
        let mut sessions = self.sessions.lock();
        Ok(ids.iter().filter(|id| sessions.remove(id.as_str()).is_some()).count())
    }

    fn list_active(&self) -> Vec<Session> {
        self.sessions.lock().values().filter(|s| s.is_active()).cloned().collect()
    }

    fn list_inactive(&self) -> Vec<Session> {
        self.sessions.lock().values().filter(|s| !s.is_active()).cloned().collect()
    }

    fn list_all(&self) -> Vec<Session> {
        self.sessions.lock().values().cloned().collect()
    }

    fn count_all(&self) -> usize {
        self.sessions.lock().len()
    }
}
