//! Request/response dispatcher.
//!
//! `prepare` builds the outgoing request without touching the network;
//! `call` sends it through the transport and classifies the outcome. Decoding
//! the payload is a separate step ([`decode`]) so callers pick the target
//! type.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::context::RequestContext;
use super::endpoints::{self, Verb};
use super::Transport;
use crate::types::{Result, SaxoError};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A fully built request, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub verb: Verb,
    pub url: reqwest::Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URL with the query string stripped, for logging.
    fn url_for_log(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.to_string()
    }
}

/// Whatever came back, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub status_line: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

/// Production transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("saxotrade/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SaxoError::TransportFailure(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse> {
        let mut builder = self.http.request(request.verb.into(), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| SaxoError::TransportFailure(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| SaxoError::TransportFailure(e.to_string()))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_line: status.to_string(),
            body: body.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Turns a context and a call name into a raw payload.
#[derive(Debug, Clone)]
pub struct Dispatcher<T = HttpTransport> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Build the request for `name` without sending it.
    pub fn prepare(&self, ctx: &RequestContext, name: &str) -> Result<PreparedRequest> {
        let endpoint = endpoints::resolve(name)?;
        let body = ctx.resolve_body()?.filter(|b| !b.is_empty());

        let mut headers = vec![("Authorization".to_string(), format!("Bearer {}", ctx.token()))];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let addressing = ctx.addressing();
        let path = endpoint.resolve_path(&addressing)?;
        let mut url = reqwest::Url::parse(ctx.base_url())
            .and_then(|base| base.join(&path))
            .map_err(|e| SaxoError::InvalidUrl(format!("{}{path}: {e}", ctx.base_url())))?;

        if endpoint.verb.carries_query() && !addressing.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &addressing {
                query.append_pair(key, value);
            }
        }

        Ok(PreparedRequest {
            verb: endpoint.verb,
            url,
            headers,
            body,
        })
    }

    /// Send the call once and return the payload of a 2xx response.
    pub async fn call(&self, ctx: &RequestContext, name: &str) -> Result<Vec<u8>> {
        let request = self.prepare(ctx, name)?;
        debug!(endpoint = name, verb = %request.verb, url = %request.url_for_log(), "Dispatching request");

        let resp = self.transport.execute(request).await?;
        debug!(endpoint = name, status = resp.status, bytes = resp.body.len(), "Response received");

        if !resp.is_success() {
            return Err(SaxoError::UpstreamRejected {
                status: resp.status,
                status_line: resp.status_line,
                body: String::from_utf8_lossy(&resp.body).into_owned(),
            });
        }
        Ok(resp.body)
    }
}

/// Decode a payload into a typed schema.
pub fn decode<D: DeserializeOwned>(payload: &[u8]) -> Result<D> {
    Ok(serde_json::from_slice(payload)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
