//! The pluggable "execute one HTTP request" seam and its `ureq` default.

use std::time::Duration;

use tracing::debug;
use ureq::{Agent, RequestBuilder};

use crate::error::{Error, Result};
use crate::http::{Context, HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP request and returns whatever the server answered.
///
/// Implementations must return non-2xx statuses as `Ok`; status
/// interpretation belongs to the decoder. Only failures below the protocol
/// layer are `Err(Error::Transport)`.
pub trait Transport: Send + Sync {
    fn execute(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
///
/// The agent owns the connection pool and is safe to share across threads.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Transport whose requests never outlive `timeout`, whatever the
    /// caller's context says.
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse> {
        let remaining = ctx.remaining();
        if remaining.is_some_and(|r| r.is_zero()) {
            return Err(Error::transport(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "deadline exceeded before request was sent",
            )));
        }

        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => prepare(self.agent.get(&url), &headers, remaining).call(),
            HttpMethod::Head => prepare(self.agent.head(&url), &headers, remaining).call(),
            HttpMethod::Post => send(prepare(self.agent.post(&url), &headers, remaining), body),
            HttpMethod::Put => send(prepare(self.agent.put(&url), &headers, remaining), body),
            HttpMethod::Patch => send(prepare(self.agent.patch(&url), &headers, remaining), body),
            HttpMethod::Delete => send(
                prepare(self.agent.delete(&url), &headers, remaining).force_send_body(),
                body,
            ),
        };

        let mut response = result.map_err(Error::transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.body_mut().read_to_vec().map_err(Error::transport)?;

        debug!(%method, status, bytes = body.len(), "transport round-trip complete");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn prepare<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(String, String)],
    remaining: Option<Duration>,
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    match remaining {
        Some(timeout) => builder.config().timeout_global(Some(timeout)).build(),
        None => builder,
    }
}

fn send(
    builder: RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
