// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound request bodies for the operations spec §4.H enumerates. Each type
//! mirrors one Registry/Launcher/Relay operation's typed arguments; `id` is
//! carried out-of-band (a path segment) for every op except `register`,
//! matching "each takes `id` plus typed arguments" (spec §4.B).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_host: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct HeartbeatRequest {
    #[serde(default)]
    pub last_chunk: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetRecordingPathRequest {
    pub path: String,
}
