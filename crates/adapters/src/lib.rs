// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fv-adapters: external collaborators of the failover control plane (spec §6).
//!
//! Two seams: the container runtime (Docker Engine API, for launching and
//! stopping backup recorders) and the object store (S3-compatible, for
//! garbage-collecting recording chunks).

pub mod container_runtime;
pub mod docker;
pub mod object_store;
pub mod s3;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use container_runtime::{ContainerRuntime, ContainerSpec};
pub use docker::DockerRuntime;
pub use object_store::ObjectStore;
pub use s3::S3ObjectStore;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeContainerRuntime, FakeObjectStore};
