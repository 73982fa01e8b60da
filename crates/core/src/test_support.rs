// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: proptest strategies for the invariant suite, plus a
//! couple of convenience constructors used by every crate's test-support
//! feature.

use crate::session::{Session, SessionId, SessionStatus};

#[cfg(feature = "test-support")]
use proptest::prelude::*;

/// A non-terminal-looking session, useful as a table-test baseline.
pub fn fresh_session(id: &str, now_ms: u64) -> Session {
    Session::new(SessionId::new(id), "client-1", Some("host-1".to_string()), "", now_ms)
}

#[cfg(feature = "test-support")]
pub fn arb_session_status() -> impl Strategy<Value = SessionStatus> {
    prop_oneof![
        Just(SessionStatus::Starting),
        Just(SessionStatus::Recording),
        Just(SessionStatus::Paused),
        Just(SessionStatus::Stopping),
        Just(SessionStatus::Completed),
        Just(SessionStatus::Failed),
        Just(SessionStatus::Inactive),
    ]
}

/// Worker-supplied session ids: alphanumerics, optionally with one or more
/// `_`-separated suffixes (the shape `base_id` splits on).
#[cfg(feature = "test-support")]
pub fn arb_session_id() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,12}(_[a-zA-Z0-9]{1,8}){0,2}"
}

#[cfg(feature = "test-support")]
pub fn arb_epoch_ms() -> impl Strategy<Value = u64> {
    0u64..10_000_000_000u64
}
