// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp formatting for wire responses.
//!
//! Storage keeps epoch milliseconds natively (spec §6); responses format
//! them as `yyyy-MM-dd HH:mm:ss` in UTC.

use chrono::{DateTime, TimeZone, Utc};

/// Format an epoch-millisecond timestamp the way responses render it.
pub fn format_timestamp(epoch_ms: u64) -> String {
    let dt: DateTime<Utc> =
        Utc.timestamp_millis_opt(epoch_ms as i64).single().unwrap_or(DateTime::<Utc>::MIN_UTC);
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
