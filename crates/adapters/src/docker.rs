// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker Engine API client, reached over a Unix domain socket.
//!
//! Speaks raw HTTP/1.1 rather than pulling in a full Docker SDK: connect,
//! write a request line, read a status line plus headers, then read the
//! body by `Content-Length`. Every request is wrapped in a fixed timeout so
//! a wedged daemon socket cannot hang the launcher indefinitely.

use crate::container_runtime::{ContainerRuntime, ContainerSpec};
use async_trait::async_trait;
use fv_core::{Error, Result};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Docker Engine API client bound to one Unix socket path.
pub struct DockerRuntime {
    socket_path: PathBuf,
}

impl DockerRuntime {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    async fn request(&self, method: &str, path: &str, body: Option<&Value>) -> Result<(u16, String)> {
        tokio::time::timeout(REQUEST_TIMEOUT, self.send(method, path, body))
            .await
            .map_err(|_| Error::RuntimeUnavailable("docker request timed out".into()))?
    }

    async fn send(&self, method: &str, path: &str, body: Option<&Value>) -> Result<(u16, String)> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| Error::RuntimeUnavailable(format!("connect failed: {e}")))?;

        let request = match body {
            Some(b) => {
                let payload = serde_json::to_string(b)
                    .map_err(|e| Error::RuntimeUnavailable(format!("encode failed: {e}")))?;
                format!(
                    "{method} {path} HTTP/1.1\r\nHost: docker\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{payload}",
                    payload.len()
                )
            }
            None => format!("{method} {path} HTTP/1.1\r\nHost: docker\r\n\r\n"),
        };

        stream
            .write_all(request.as_bytes())
            .await
            .map_err(|e| Error::RuntimeUnavailable(format!("write failed: {e}")))?;

        let mut reader = BufReader::new(&mut stream);
        read_http_response(&mut reader).await
    }

    fn container_label(id_label: &str) -> Value {
        json!({ "label": [id_label] })
    }
}

async fn read_http_response<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<(u16, String)> {
    let mut status_line = String::new();
    reader
        .read_line(&mut status_line)
        .await
        .map_err(|e| Error::RuntimeUnavailable(format!("read status failed: {e}")))?;
    let status_code =
        status_line.split_whitespace().nth(1).and_then(|s| s.parse::<u16>().ok()).unwrap_or(0);

    let mut content_length: usize = 0;
    loop {
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| Error::RuntimeUnavailable(format!("read header failed: {e}")))?;
        if line == "\r\n" || line.is_empty() {
            break;
        }
        let line_lower = line.to_ascii_lowercase();
        if let Some(val) = line_lower.strip_prefix("content-length:") {
            content_length = val.trim().parse().unwrap_or(0);
        }
    }

    let body = if content_length > 0 {
        let mut buf = vec![0u8; content_length];
        reader
            .read_exact(&mut buf)
            .await
            .map_err(|e| Error::RuntimeUnavailable(format!("read body failed: {e}")))?;
        String::from_utf8_lossy(&buf).into_owned()
    } else {
        String::new()
    };

    Ok((status_code, body))
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn ping(&self) -> Result<()> {
        let (status, body) = self.request("GET", "/_ping", None).await?;
        if status == 200 {
            Ok(())
        } else {
            Err(Error::RuntimeUnavailable(format!("ping returned {status}: {body}")))
        }
    }

    async fn image_exists(&self, image: &str) -> Result<bool> {
        let path = format!("/images/{image}/json");
        let (status, body) = self.request("GET", &path, None).await?;
        match status {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(Error::ImageNotFound(format!("inspect {image} returned {status}: {body}"))),
        }
    }

    async fn pull_image(&self, image: &str, tag: &str) -> Result<()> {
        let path = format!("/images/create?fromImage={image}&tag={tag}");
        let (status, body) = self.request("POST", &path, None).await?;
        if status == 200 {
            Ok(())
        } else {
            Err(Error::ImageNotFound(format!("pull {image}:{tag} returned {status}: {body}")))
        }
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        let env: Vec<String> = spec.env.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let body = json!({
            "Image": spec.image,
            "Env": env,
            "Labels": spec.labels,
            "HostConfig": {
                "NetworkMode": spec.network,
                "ShmSize": spec.shm_bytes,
                "Memory": spec.memory_bytes,
                "NanoCpus": spec.cpu_count * 1_000_000_000,
                "AutoRemove": false,
                "RestartPolicy": { "Name": "no" },
            },
        });
        let path = format!("/containers/create?name={}", spec.name);
        let (status, resp_body) = self.request("POST", &path, Some(&body)).await?;
        if status != 201 {
            return Err(Error::ContainerCreateFailed(format!(
                "create {} returned {status}: {resp_body}",
                spec.name
            )));
        }
        let parsed: Value = serde_json::from_str(&resp_body)
            .map_err(|e| Error::ContainerCreateFailed(format!("bad create response: {e}")))?;
        parsed["Id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::ContainerCreateFailed("create response missing Id".into()))
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        let path = format!("/containers/{id}/start");
        let (status, body) = self.request("POST", &path, None).await?;
        if status == 204 || status == 304 {
            Ok(())
        } else {
            Err(Error::ContainerStartFailed(format!("start {id} returned {status}: {body}")))
        }
    }

    async fn stop_container(&self, id: &str, grace_secs: u32) -> Result<()> {
        let path = format!("/containers/{id}/stop?t={grace_secs}");
        let (status, body) = self.request("POST", &path, None).await?;
        if status == 204 || status == 304 {
            Ok(())
        } else {
            Err(Error::ContainerStopFailed(format!("stop {id} returned {status}: {body}")))
        }
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        let path = format!("/containers/{id}?force=true");
        let (status, body) = self.request("DELETE", &path, None).await?;
        if status == 204 {
            Ok(())
        } else {
            Err(Error::ContainerStopFailed(format!("remove {id} returned {status}: {body}")))
        }
    }

    async fn list_containers_by_label(&self, label: &str) -> Result<Vec<(String, String)>> {
        let filters = Self::container_label(label).to_string();
        let path = format!("/containers/json?all=true&filters={}", urlencode(&filters));
        let (status, body) = self.request("GET", &path, None).await?;
        if status != 200 {
            return Err(Error::RuntimeUnavailable(format!("list returned {status}: {body}")));
        }
        let parsed: Vec<Value> = serde_json::from_str(&body)
            .map_err(|e| Error::RuntimeUnavailable(format!("bad list response: {e}")))?;
        Ok(parsed
            .iter()
            .filter_map(|c| {
                let id = c["Id"].as_str()?.to_string();
                let name = c["Names"].as_array()?.first()?.as_str()?.trim_start_matches('/').to_string();
                Some((id, name))
            })
            .collect())
    }
}

/// Minimal percent-encoding sufficient for the `filters` query parameter.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
