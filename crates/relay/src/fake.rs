// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted [`HttpTransport`] for relay unit tests and daemon integration tests.

use crate::transport::{HttpTransport, OutboundRequest, TransportError, TransportResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Status(u16),
    Error,
}

#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses in call order; once exhausted, further calls return the last one.
    pub fn push(&self, response: ScriptedResponse) {
        self.script.lock().push_back(response);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().push(request);
        let next = {
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };
        match next {
            Some(ScriptedResponse::Status(status)) => {
                Ok(TransportResponse { status, body: String::new() })
            }
            Some(ScriptedResponse::Error) | None => {
                Err(TransportError::Transport("connection reset".to_string()))
            }
        }
    }
}
