// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for crash recovery.
//!
//! A snapshot captures the full session map at a point in time, tagged with
//! the WAL sequence number it was taken at. Recovery loads the snapshot (if
//! present) and replays only the WAL entries appended after that point.

use crate::error::StorageResult;
use chrono::{DateTime, Utc};
use fv_core::Session;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub seq: u64,
    pub sessions: HashMap<String, Session>,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, sessions: HashMap<String, Session>) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, sessions, created_at: Utc::now() }
    }

    /// Write atomically: serialize to a `.tmp` sibling, rotate any existing
    /// snapshot into a `.bak`, then rename the tmp file into place.
    pub fn write(&self, path: &Path) -> StorageResult<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(self)?)?;
        if path.exists() {
            let bak = rotate_bak_path(path);
            fs::rename(path, bak)?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> StorageResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fv_core::SessionId;

    #[test]
    fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.json");
        let mut sessions = HashMap::new();
        sessions.insert(
            "s1".to_string(),
            Session::new(SessionId::new("s1"), "client-1", None, "", 1_000),
        );
        let snap = Snapshot::new(5, sessions);
        snap.write(&path).expect("write");

        let loaded = Snapshot::load(&path).expect("load").expect("present");
        assert_eq!(loaded.seq, 5);
        assert_eq!(loaded.sessions.len(), 1);
    }

    #[test]
    fn load_missing_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.json");
        assert!(Snapshot::load(&path).expect("load").is_none());
    }

    #[test]
    fn second_write_rotates_into_bak() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.json");
        Snapshot::new(1, HashMap::new()).write(&path).expect("write 1");
        Snapshot::new(2, HashMap::new()).write(&path).expect("write 2");
        assert!(path.with_extension("bak").exists());
        let loaded = Snapshot::load(&path).expect("load").expect("present");
        assert_eq!(loaded.seq, 2);
    }
}
