// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Header composition for a single relay delivery (spec §4.F step 1-2).

use std::collections::HashMap;

/// Parse the configured `"K1:V1,K2:V2"` default-header list (spec §6 `relay.headers`).
pub fn parse_default_headers(raw: Option<&str>) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    let Some(raw) = raw else { return headers };
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some((k, v)) = pair.split_once(':') {
            headers.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    headers
}

/// Build the full header set for one outbound delivery: defaults, merged
/// with the inbound subset spec §4.F step 1 allows through, plus the
/// relay-identification headers from step 2.
pub fn build_headers(
    defaults: &HashMap<String, String>,
    inbound: &[(String, String)],
    service_id: &str,
    now_epoch_ms: u64,
) -> HashMap<String, String> {
    let mut headers = defaults.clone();
    headers.entry("Content-Type".to_string()).or_insert_with(|| "application/json".to_string());

    for (name, value) in inbound {
        let lower = name.to_ascii_lowercase();
        if lower == "content-type" {
            headers.insert("Content-Type".to_string(), value.clone());
        } else if lower == "user-agent" {
            headers.insert("User-Agent".to_string(), format!("OpenVidu-Relay/{value}"));
        } else if lower.starts_with("openvidu-") || lower.starts_with("x-openvidu-") {
            headers.insert(name.clone(), value.clone());
        }
    }

    headers.insert("X-Relay-Source".to_string(), service_id.to_string());
    headers.insert("X-Relay-Timestamp".to_string(), now_epoch_ms.to_string());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_default_headers() {
        let headers = parse_default_headers(Some("K1:V1,K2:V2"));
        assert_eq!(headers.get("K1"), Some(&"V1".to_string()));
        assert_eq!(headers.get("K2"), Some(&"V2".to_string()));
    }

    #[test]
    fn none_default_headers_yields_empty_map() {
        assert!(parse_default_headers(None).is_empty());
    }

    #[test]
    fn content_type_defaults_to_json_when_absent() {
        let headers = build_headers(&HashMap::new(), &[], "relay-1", 1000);
        assert_eq!(headers.get("Content-Type"), Some(&"application/json".to_string()));
    }

    #[test]
    fn inbound_content_type_overrides_default() {
        let inbound = vec![("Content-Type".to_string(), "text/plain".to_string())];
        let headers = build_headers(&HashMap::new(), &inbound, "relay-1", 1000);
        assert_eq!(headers.get("Content-Type"), Some(&"text/plain".to_string()));
    }

    #[test]
    fn user_agent_gets_prefixed() {
        let inbound = vec![("User-Agent".to_string(), "worker/1.0".to_string())];
        let headers = build_headers(&HashMap::new(), &inbound, "relay-1", 1000);
        assert_eq!(headers.get("User-Agent"), Some(&"OpenVidu-Relay/worker/1.0".to_string()));
    }

    #[test]
    fn openvidu_prefixed_headers_pass_through_case_insensitively() {
        let inbound = vec![
            ("X-OpenVidu-Session".to_string(), "s1".to_string()),
            ("openvidu-role".to_string(), "publisher".to_string()),
            ("Authorization".to_string(), "secret".to_string()),
        ];
        let headers = build_headers(&HashMap::new(), &inbound, "relay-1", 1000);
        assert_eq!(headers.get("X-OpenVidu-Session"), Some(&"s1".to_string()));
        assert_eq!(headers.get("openvidu-role"), Some(&"publisher".to_string()));
        assert!(!headers.contains_key("Authorization"));
    }

    #[test]
    fn relay_identification_headers_always_present() {
        let headers = build_headers(&HashMap::new(), &[], "relay-svc", 42);
        assert_eq!(headers.get("X-Relay-Source"), Some(&"relay-svc".to_string()));
        assert_eq!(headers.get("X-Relay-Timestamp"), Some(&"42".to_string()));
    }
}
