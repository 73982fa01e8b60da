// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fv-relay: Notification Relay (spec §4.F).
//!
//! Accepts inbound notification payloads, forwards them to an
//! operator-configured receiver on a bounded worker pool with retry, and
//! tracks delivery metrics. The inbound call also performs a synchronous
//! secondary action (the terminal-status shortcut) via [`SessionStopHook`],
//! kept as a trait seam so this crate does not depend on `fv-engine`.

pub mod headers;
pub mod metrics;
pub mod relay;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use metrics::RelayMetricsSnapshot;
pub use relay::{InboundNotification, NotificationRelay, RelayAck, SessionStopHook};
pub use transport::{HttpTransport, OutboundRequest, ReqwestTransport, TransportError, TransportResponse};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTransport;
