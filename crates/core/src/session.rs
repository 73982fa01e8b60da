// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session entity: the unit of work tracked by the failover control plane.
//!
//! A session represents one recording in progress (or finished). It is
//! created by [`crate::session::Session::new`] when a worker registers, and
//! mutated in place by the registry as heartbeats, status changes, and
//! backup-launch writes arrive. See spec §3 for the full invariant list.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::time::Duration;

/// Unique identifier for a recording session.
///
/// Opaque and worker-supplied (unlike most ID types in this codebase,
/// sessions are never minted internally — `register` takes the id as given).
/// The portion before the first `_` is the *base id* used for object-store
/// pathing; see [`base_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SessionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Return the object-store base id for a session id: the portion before the
/// first `_`, or the whole id if there is no `_` (spec §4.C).
pub fn base_id(session_id: &str) -> &str {
    session_id.split('_').next().unwrap_or(session_id)
}

/// Session lifecycle status (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Starting,
    Recording,
    Paused,
    Stopping,
    Completed,
    Failed,
    Inactive,
}

crate::simple_display! {
    SessionStatus {
        Starting => "STARTING",
        Recording => "RECORDING",
        Paused => "PAUSED",
        Stopping => "STOPPING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Inactive => "INACTIVE",
    }
}

impl SessionStatus {
    /// True for the statuses that invariant I2 requires `active == false`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Paused
                | SessionStatus::Stopping
                | SessionStatus::Completed
                | SessionStatus::Failed
                | SessionStatus::Inactive
        )
    }
}

/// A recording session record (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub client_id: String,
    #[serde(default)]
    pub client_host: Option<String>,
    pub status: SessionStatus,
    pub created_at_ms: u64,
    pub last_heartbeat_ms: u64,
    #[serde(default)]
    pub last_chunk: Option<String>,
    #[serde(default)]
    pub recording_path: Option<String>,
    #[serde(default)]
    pub metadata: String,
    pub active: bool,
    #[serde(default)]
    pub backup_container_id: Option<String>,
    #[serde(default)]
    pub backup_container_name: Option<String>,
}

impl Session {
    /// Construct a freshly-registered session: STARTING, active, `createdAt
    /// == lastHeartbeat == now` (I5 holds trivially at construction).
    pub fn new(
        id: SessionId,
        client_id: impl Into<String>,
        client_host: Option<String>,
        metadata: impl Into<String>,
        now_ms: u64,
    ) -> Self {
        Self {
            id,
            client_id: client_id.into(),
            client_host,
            status: SessionStatus::Starting,
            created_at_ms: now_ms,
            last_heartbeat_ms: now_ms,
            last_chunk: None,
            recording_path: None,
            metadata: metadata.into(),
            active: true,
            backup_container_id: None,
            backup_container_name: None,
        }
    }

    /// `isActive()` per spec §3: `active == true ∧ status ∈ {STARTING, RECORDING}`.
    pub fn is_active(&self) -> bool {
        self.active && matches!(self.status, SessionStatus::Starting | SessionStatus::Recording)
    }

    /// `isInactive(T)` per spec §3: `lastHeartbeat` older than `now - T`.
    pub fn is_inactive(&self, now_ms: u64, max_inactive: Duration) -> bool {
        let threshold_ms = max_inactive.as_millis() as u64;
        now_ms.saturating_sub(self.last_heartbeat_ms) > threshold_ms
    }

    /// Apply a status transition, enforcing I2 (terminal statuses clear `active`).
    pub fn set_status(&mut self, status: SessionStatus, now_ms: u64) {
        self.status = status;
        if status.is_terminal() {
            self.active = false;
        }
        self.last_heartbeat_ms = now_ms;
    }

    /// The object-store base id for this session (spec §4.C).
    pub fn base_id(&self) -> &str {
        base_id(&self.id.0)
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct SessionBuilder => Session {
        into { id: SessionId = "s1" }
        into { client_id: String = "client-1" }
        into { metadata: String = "" }
        option { client_host: String = None }
        set { status: SessionStatus = SessionStatus::Starting }
        set { created_at_ms: u64 = 0 }
        set { last_heartbeat_ms: u64 = 0 }
        option { last_chunk: String = None }
        option { recording_path: String = None }
        set { active: bool = true }
        option { backup_container_id: String = None }
        option { backup_container_name: String = None }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
