// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input validation for the Registry-facing API surface (spec §4.H): "this
//! layer validates inputs (non-empty ids, status enum membership)".

use fv_core::SessionStatus;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`{field}` must not be blank")]
    Blank { field: &'static str },

    #[error("`{value}` is not a recognized status")]
    UnknownStatus { value: String },
}

/// Non-empty, non-whitespace-only id (applies to session ids and client ids alike).
pub fn validate_session_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::Blank { field: "id" });
    }
    Ok(())
}

/// Parse a status string against the enum spec §3 defines, case-insensitively
/// (wire payloads arrive as uppercase per §6, but callers may send either).
pub fn validate_status(raw: &str) -> Result<SessionStatus, ValidationError> {
    match raw.to_ascii_uppercase().as_str() {
        "STARTING" => Ok(SessionStatus::Starting),
        "RECORDING" => Ok(SessionStatus::Recording),
        "PAUSED" => Ok(SessionStatus::Paused),
        "STOPPING" => Ok(SessionStatus::Stopping),
        "COMPLETED" => Ok(SessionStatus::Completed),
        "FAILED" => Ok(SessionStatus::Failed),
        "INACTIVE" => Ok(SessionStatus::Inactive),
        other => Err(ValidationError::UnknownStatus { value: other.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_is_rejected() {
        assert_eq!(validate_session_id("   "), Err(ValidationError::Blank { field: "id" }));
        assert!(validate_session_id("s1").is_ok());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(validate_status("recording").expect("parses"), SessionStatus::Recording);
        assert_eq!(validate_status("FAILED").expect("parses"), SessionStatus::Failed);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(validate_status("BOGUS").is_err());
    }
}
