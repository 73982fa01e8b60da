// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of session mutations.
//!
//! Each entry is a JSON line appended to the log file and fsync'd before the
//! call that produced it returns. Replaying the log in order, starting from
//! an (optional) snapshot, reconstructs the materialized session map exactly.

use crate::error::{StorageError, StorageResult};
use fv_core::Session;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// One durable mutation: either a full record put, or a deletion by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalEntry {
    Put(Session),
    Delete(String),
}

/// Append-only log, replayed from disk at startup.
pub struct Wal {
    path: PathBuf,
    file: File,
    /// Number of entries appended since the log was opened or last truncated.
    seq: u64,
}

impl Wal {
    /// Open (creating if absent) the log file at `path` for appending.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file, seq: 0 })
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Append one entry and fsync before returning.
    pub fn append(&mut self, entry: &WalEntry) -> StorageResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.sync_data()?;
        self.seq += 1;
        Ok(())
    }

    /// Replay every entry currently on disk, in order.
    pub fn replay(path: &Path) -> StorageResult<Vec<WalEntry>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: WalEntry = serde_json::from_str(&line).map_err(|e| StorageError::Corrupt {
                offset: i as u64,
                reason: e.to_string(),
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Truncate the log to empty and reset the sequence counter, used after a
    /// checkpoint has captured every entry into a snapshot.
    pub fn truncate(&mut self) -> StorageResult<()> {
        self.file = OpenOptions::new().create(true).write(true).truncate(true).open(&self.path)?;
        self.seq = 0;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
