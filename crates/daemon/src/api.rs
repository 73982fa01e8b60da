// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry-facing API surface handlers (spec §4.H): input validation plus
//! routing to the Registry/Launcher/Relay. A real HTTP router's job — URL
//! parsing, auth, content negotiation — stays out of scope (spec §1); this
//! module is what such a router would call into for every operation it
//! exposes, already mapped to the typed DTOs in `fv-wire`.

use crate::bootstrap::ControlPlane;
use crate::status;
use fv_core::{Clock, Error};
use fv_wire::{
    BackupEntry, CountsResponse, FailoverStatusResponse, HeartbeatRequest, RegisterRequest,
    SessionListResponse, SessionResponse, SessionView, SetRecordingPathRequest, SetStatusRequest,
    ValidationError,
};

pub type ApiResult<T> = Result<T, ApiError>;

/// Every error this layer can surface, already in the two buckets the wire
/// crate's [`fv_wire::ErrorResponse`] understands (spec §4.H: "the only
/// place that translates domain errors into user-visible codes").
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Domain(Error),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Domain(e)
    }
}

impl From<ApiError> for fv_wire::ErrorResponse {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Validation(e) => e.into(),
            ApiError::Domain(e) => (&e).into(),
        }
    }
}

pub async fn register<C: Clock>(plane: &ControlPlane<C>, req: RegisterRequest) -> ApiResult<SessionResponse> {
    fv_wire::validate_session_id(&req.id)?;
    fv_wire::validate_session_id(&req.client_id)?;
    let session = plane.registry.register(req.id, req.client_id, req.client_host, req.metadata.unwrap_or_default())?;
    Ok(SessionResponse { session: session.into() })
}

pub async fn heartbeat<C: Clock>(
    plane: &ControlPlane<C>,
    id: &str,
    req: HeartbeatRequest,
) -> ApiResult<SessionResponse> {
    fv_wire::validate_session_id(id)?;
    let session = plane.registry.heartbeat(id, req.last_chunk)?;
    Ok(SessionResponse { session: session.into() })
}

pub async fn set_status<C: Clock>(
    plane: &ControlPlane<C>,
    id: &str,
    req: SetStatusRequest,
) -> ApiResult<SessionResponse> {
    fv_wire::validate_session_id(id)?;
    let status = fv_wire::validate_status(&req.status)?;
    let session = plane.registry.set_status(id, status)?;
    Ok(SessionResponse { session: session.into() })
}

pub async fn set_recording_path<C: Clock>(
    plane: &ControlPlane<C>,
    id: &str,
    req: SetRecordingPathRequest,
) -> ApiResult<SessionResponse> {
    fv_wire::validate_session_id(id)?;
    let session = plane.registry.set_recording_path(id, req.path)?;
    Ok(SessionResponse { session: session.into() })
}

pub async fn stop<C: Clock>(plane: &ControlPlane<C>, id: &str) -> ApiResult<SessionResponse> {
    fv_wire::validate_session_id(id)?;
    let session = plane.registry.stop(id)?;
    Ok(SessionResponse { session: session.into() })
}

pub async fn mark_inactive<C: Clock>(plane: &ControlPlane<C>, id: &str) -> ApiResult<SessionResponse> {
    fv_wire::validate_session_id(id)?;
    let session = plane.registry.mark_inactive(id)?;
    Ok(SessionResponse { session: session.into() })
}

pub async fn remove<C: Clock>(plane: &ControlPlane<C>, id: &str) -> ApiResult<()> {
    fv_wire::validate_session_id(id)?;
    plane.registry.remove(id)?;
    Ok(())
}

pub async fn get<C: Clock>(plane: &ControlPlane<C>, id: &str) -> ApiResult<SessionResponse> {
    fv_wire::validate_session_id(id)?;
    let session = plane.registry.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
    Ok(SessionResponse { session: session.into() })
}

pub async fn exists<C: Clock>(plane: &ControlPlane<C>, id: &str) -> ApiResult<bool> {
    fv_wire::validate_session_id(id)?;
    Ok(plane.registry.exists(id))
}

pub async fn list<C: Clock>(plane: &ControlPlane<C>) -> SessionListResponse {
    SessionListResponse { sessions: plane.registry.list_all().iter().map(SessionView::from).collect() }
}

pub async fn list_active<C: Clock>(plane: &ControlPlane<C>) -> SessionListResponse {
    SessionListResponse { sessions: plane.registry.list_active().iter().map(SessionView::from).collect() }
}

pub async fn list_inactive<C: Clock>(plane: &ControlPlane<C>) -> SessionListResponse {
    SessionListResponse {
        sessions: plane.registry.list_inactive().iter().map(SessionView::from).collect(),
    }
}

pub async fn counts<C: Clock>(plane: &ControlPlane<C>) -> CountsResponse {
    CountsResponse {
        active: plane.registry.count_active(),
        inactive: plane.registry.count_inactive(),
        all: plane.registry.count_all(),
    }
}

pub async fn failover_status<C: Clock>(plane: &ControlPlane<C>) -> FailoverStatusResponse {
    status::aggregate(plane).await
}

/// `failover.check` (spec §4.H): manual detector trigger, reusing the same
/// tick the scheduler fires periodically (overlap-safe, spec §4.D).
pub async fn failover_check<C: Clock>(plane: &ControlPlane<C>) -> fv_engine::DetectorTickReport {
    plane.detector.tick().await
}

pub async fn failover_stop_backup<C: Clock>(plane: &ControlPlane<C>, id: &str) -> ApiResult<()> {
    fv_wire::validate_session_id(id)?;
    plane.launcher.stop_backup(id).await?;
    Ok(())
}

pub async fn failover_list_backups<C: Clock>(plane: &ControlPlane<C>) -> Vec<BackupEntry> {
    plane
        .launcher
        .list_tracked()
        .await
        .into_iter()
        .map(|(session_id, container_id, container_name)| BackupEntry { session_id, container_id, container_name })
        .collect()
}

/// `webhook.receive` (spec §4.F, §4.H): any method, unauthenticated by
/// design (spec §6: "the upstream notifier is untrusted network-adjacent").
pub async fn webhook_receive<C: Clock>(
    plane: &ControlPlane<C>,
    notification: fv_relay::InboundNotification,
) -> fv_relay::RelayAck {
    plane.relay.receive(notification)
}

pub async fn webhook_status<C: Clock>(plane: &ControlPlane<C>) -> fv_wire::RelayMetricsView {
    status::relay_metrics_view(plane.relay.metrics())
}
