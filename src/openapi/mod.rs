//! Broker OpenAPI integration.
//!
//! A symbolic call name is resolved to an endpoint, the caller's parameters
//! are projected and merged with the session keys, the request goes out
//! through a [`Transport`], and the raw payload comes back for an explicit
//! decode into one of the [`models`].

pub mod auth;
pub mod client;
pub mod context;
pub mod dispatch;
pub mod endpoints;
pub mod models;
pub mod params;

use async_trait::async_trait;

use crate::types::Result;
use dispatch::{PreparedRequest, RawResponse};

pub use client::SaxoClient;
pub use context::RequestContext;
pub use dispatch::{decode, Dispatcher, HttpTransport};
pub use params::Instruction;

/// Simulation gateway base URL.
pub const SIM_BASE_URL: &str = "https://gateway.saxobank.com/sim/openapi/";

/// Executes one prepared request and reports the raw outcome.
///
/// Implementations must not retry and must not classify status codes; any
/// response that arrives is returned as a [`RawResponse`]. Only a failure to
/// get a response at all is an error (`TransportFailure`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse>;
}
