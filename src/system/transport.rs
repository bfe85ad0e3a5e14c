// src/system/transport.rs

//! HTTP transport to the CLI endpoint.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;

/// A request to the CLI endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Absolute endpoint URL.
    pub url: String,
    /// Header name and value pairs, sent in order.
    pub headers: Vec<(&'static str, String)>,
    /// JSON-encoded request body.
    pub body: Vec<u8>,
}

/// The parts of an HTTP response the client acts on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Header names are stored lower-cased.
    pub headers: HashMap<String, String>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns a non-empty header value, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Sends requests to the API. Any HTTP status counts as a response; only
/// connection-level failures are errors.
pub trait Transport {
    /// Sends `request` and returns whatever the server answered.
    fn post(&mut self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Blocking transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    /// Builds an agent that treats every HTTP status as a normal response.
    pub fn new() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn post(&mut self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let resp = builder
            .send(request.body.as_slice())
            .with_context(|| format!("POST {}", request.url))?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| match value.to_str() {
                Ok(v) => Some((name.as_str().to_ascii_lowercase(), v.to_string())),
                Err(_) => {
                    log::debug!("dropping header '{}': value is not visible ASCII", name);
                    None
                }
            })
            .collect();

        let mut reader = resp.into_body().into_reader();
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .with_context(|| format!("read response body from {}", request.url))?;

        log::debug!("received: status={} body_len={}", status, body.len());
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
