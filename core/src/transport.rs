//! Default `Transport` backed by a blocking `ureq` agent.
//!
//! The agent is configured so 4xx/5xx responses come back as data rather
//! than `Err`, leaving status interpretation to the pipeline. `ureq::Agent`
//! pools connections internally and is cheap to clone, so one transport can
//! serve concurrent callers.

use std::io;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap an agent the caller configured (proxy, TLS roots, ...). The agent
    /// must not treat HTTP status codes as errors.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(
        &self,
        request: &HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let query = request
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()));

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder
                    .query_pairs(query)
                    .config()
                    .timeout_global(Some(timeout))
                    .build()
                    .call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                let builder = builder
                    .query_pairs(query)
                    .config()
                    .timeout_global(Some(timeout))
                    .build();
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(classify)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Sort a `ureq` failure into timeout, connection, or non-transient request
/// failure.
fn classify(err: ureq::Error) -> TransportError {
    match err {
        e @ ureq::Error::Timeout(_) => TransportError::Timeout(e.to_string()),
        ureq::Error::Io(e) if is_timeout(&e) => TransportError::Timeout(e.to_string()),
        ureq::Error::Io(e) => TransportError::Connection(e.to_string()),
        e @ (ureq::Error::HostNotFound
        | ureq::Error::ConnectionFailed
        | ureq::Error::Protocol(_)) => TransportError::Connection(e.to_string()),
        other => TransportError::Request(other.to_string()),
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}
