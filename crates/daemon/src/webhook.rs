// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges [`fv_relay::SessionStopHook`] to the Registry, so the relay
//! crate stays free of an `fv-engine` dependency (spec §4.F terminal-status
//! shortcut: "invokes Registry `setStatus(id, STOPPING)`").

use fv_core::{Clock, SessionStatus};
use fv_engine::Registry;
use fv_relay::SessionStopHook;
use std::sync::Arc;

pub struct RegistryStopHook<C: Clock> {
    registry: Arc<Registry<C>>,
}

impl<C: Clock> RegistryStopHook<C> {
    pub fn new(registry: Arc<Registry<C>>) -> Self {
        Self { registry }
    }
}

impl<C: Clock> SessionStopHook for RegistryStopHook<C> {
    fn mark_stopping(&self, session_id: &str) -> bool {
        self.registry.set_status(session_id, SessionStatus::Stopping).is_ok()
    }
}
