// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound response bodies for the Registry-facing API surface (spec §4.H).

use crate::session_view::SessionView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionResponse {
    pub session: SessionView,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionView>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountsResponse {
    pub active: usize,
    pub inactive: usize,
    pub all: usize,
}

/// The single shape every domain error (spec §7) is rendered into on the
/// wire. `code` is the status class from [`fv_core::Error::status_class`];
/// `fv-daemon` maps it to the transport's actual status code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&fv_core::Error> for ErrorResponse {
    fn from(e: &fv_core::Error) -> Self {
        Self { code: e.status_class().to_string(), message: e.to_string() }
    }
}

impl From<crate::ValidationError> for ErrorResponse {
    fn from(e: crate::ValidationError) -> Self {
        Self { code: "400".to_string(), message: e.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_class() {
        let err = fv_core::Error::NotFound("s1".into());
        let resp = ErrorResponse::from(&err);
        assert_eq!(resp.code, "404");
        assert!(resp.message.contains("s1"));
    }

    #[test]
    fn validation_error_maps_to_400_class() {
        let err = crate::ValidationError::Blank { field: "id" };
        let resp: ErrorResponse = err.into();
        assert_eq!(resp.code, "400");
    }
}
