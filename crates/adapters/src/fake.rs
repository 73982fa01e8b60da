// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory runtime and object store fakes for engine/daemon unit tests.

use crate::container_runtime::{ContainerRuntime, ContainerSpec};
use crate::object_store::ObjectStore;
use async_trait::async_trait;
use fv_core::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct RuntimeState {
    images: std::collections::HashSet<String>,
    containers: HashMap<String, ContainerSpec>,
    started: std::collections::HashSet<String>,
    next_id: u64,
    /// When set, every call returns this error instead of acting.
    fail_with: Option<String>,
}

/// In-memory [`ContainerRuntime`] for launcher unit tests.
#[derive(Default)]
pub struct FakeContainerRuntime {
    state: Mutex<RuntimeState>,
}

impl FakeContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, image: &str) -> Self {
        self.state.lock().images.insert(image.to_string());
        self
    }

    pub fn fail_with(&self, reason: &str) {
        self.state.lock().fail_with = Some(reason.to_string());
    }

    pub fn is_started(&self, id: &str) -> bool {
        self.state.lock().started.contains(id)
    }

    pub fn container_count(&self) -> usize {
        self.state.lock().containers.len()
    }
}

#[async_trait]
impl ContainerRuntime for FakeContainerRuntime {
    async fn ping(&self) -> Result<()> {
        let state = self.state.lock();
        match &state.fail_with {
            Some(reason) => Err(Error::RuntimeUnavailable(reason.clone())),
            None => Ok(()),
        }
    }

    async fn image_exists(&self, image: &str) -> Result<bool> {
        Ok(self.state.lock().images.contains(image))
    }

    async fn pull_image(&self, image: &str, _tag: &str) -> Result<()> {
        self.state.lock().images.insert(image.to_string());
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        let mut state = self.state.lock();
        if let Some(reason) = state.fail_with.clone() {
            return Err(Error::ContainerCreateFailed(reason));
        }
        state.next_id += 1;
        let id = format!("fake-container-{}", state.next_id);
        state.containers.insert(id.clone(), spec.clone());
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        self.state.lock().started.insert(id.to_string());
        Ok(())
    }

    async fn stop_container(&self, id: &str, _grace_secs: u32) -> Result<()> {
        self.state.lock().started.remove(id);
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        self.state.lock().containers.remove(id);
        Ok(())
    }

    async fn list_containers_by_label(&self, _label: &str) -> Result<Vec<(String, String)>> {
        let state = self.state.lock();
        Ok(state.containers.iter().map(|(id, spec)| (id.clone(), spec.name.clone())).collect())
    }
}

/// In-memory [`ObjectStore`] for GC unit tests.
#[derive(Default)]
pub struct FakeObjectStore {
    keys: Mutex<Vec<String>>,
    bucket_missing: Mutex<bool>,
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, keys: impl IntoIterator<Item = String>) {
        self.keys.lock().extend(keys);
    }

    pub fn remaining(&self) -> Vec<String> {
        self.keys.lock().clone()
    }

    /// Make `head_bucket` fail, simulating a missing bucket at startup
    /// (spec §4.C: "fatal to GC initialization only").
    pub fn mark_bucket_missing(&self) {
        *self.bucket_missing.lock() = true;
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn head_bucket(&self) -> Result<()> {
        if *self.bucket_missing.lock() {
            Err(Error::ObjectStore("bucket not found".to_string()))
        } else {
            Ok(())
        }
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.keys.lock().iter().filter(|k| k.starts_with(prefix)).cloned().collect())
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<()> {
        self.keys.lock().retain(|k| !keys.contains(k));
        Ok(())
    }
}
