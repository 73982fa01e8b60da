// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-layer error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("wal entry corrupt at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl From<StorageError> for fv_core::Error {
    fn from(e: StorageError) -> Self {
        fv_core::Error::StoreUnavailable(e.to_string())
    }
}
