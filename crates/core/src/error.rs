// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain error taxonomy (spec §7).
//!
//! These are the error *kinds* the registry/engine raise. The API surface
//! (`fv-daemon`) is the single place that maps them to HTTP status classes;
//! nothing below this layer should know about status codes.

use thiserror::Error;

/// Domain-level error kinds shared across the registry, launcher, GC, and relay.
#[derive(Debug, Error)]
pub enum Error {
    /// Registry op referenced an id that does not exist.
    #[error("session not found: {0}")]
    NotFound(String),

    /// `register` called with an id that already exists.
    #[error("session already exists: {0}")]
    AlreadyExists(String),

    /// API-layer input validation failure (missing/blank field, bad enum value).
    #[error("validation error: {0}")]
    Validation(String),

    /// Store backend is transiently unavailable.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Container runtime client not initialized, or failed to initialize.
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("container create failed: {0}")]
    ContainerCreateFailed(String),

    #[error("container start failed: {0}")]
    ContainerStartFailed(String),

    #[error("container stop failed: {0}")]
    ContainerStopFailed(String),

    /// Object store operation failed (GC path); never rolls back a registry `remove`.
    #[error("object store error: {0}")]
    ObjectStore(String),

    /// Outbound relay delivery failed transiently (5xx / transport); retried per policy.
    #[error("relay transport error: {0}")]
    RelayTransport(String),

    /// Outbound relay delivery failed permanently (4xx); not retried.
    #[error("relay client error: {0}")]
    RelayClient(String),
}

impl Error {
    /// A coarse status-class label, for the API surface and for logging.
    pub fn status_class(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "404",
            Error::AlreadyExists(_) => "409",
            Error::Validation(_) => "400",
            Error::StoreUnavailable(_) => "503",
            Error::RuntimeUnavailable(_)
            | Error::ImageNotFound(_)
            | Error::ContainerCreateFailed(_)
            | Error::ContainerStartFailed(_)
            | Error::ContainerStopFailed(_) => "502",
            Error::ObjectStore(_) => "500",
            Error::RelayTransport(_) | Error::RelayClient(_) => "502",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
