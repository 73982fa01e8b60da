// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-model of [`fv_core::Session`] for API responses: timestamps are
//! rendered `yyyy-MM-dd HH:mm:ss` (spec §6), matching storage's native
//! epoch-millisecond representation only internally.

use fv_core::{format_timestamp, Session};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionView {
    pub id: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_host: Option<String>,
    pub status: String,
    pub created_at: String,
    pub last_heartbeat: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_chunk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_path: Option<String>,
    pub metadata: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_container_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_container_name: Option<String>,
}

impl From<&Session> for SessionView {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.as_str().to_string(),
            client_id: s.client_id.clone(),
            client_host: s.client_host.clone(),
            status: s.status.to_string(),
            created_at: format_timestamp(s.created_at_ms),
            last_heartbeat: format_timestamp(s.last_heartbeat_ms),
            last_chunk: s.last_chunk.clone(),
            recording_path: s.recording_path.clone(),
            metadata: s.metadata.clone(),
            active: s.active,
            backup_container_id: s.backup_container_id.clone(),
            backup_container_name: s.backup_container_name.clone(),
        }
    }
}

impl From<Session> for SessionView {
    fn from(s: Session) -> Self {
        Self::from(&s)
    }
}
