//! OAuth2 authorization-code exchange against the broker's token endpoint.
//!
//! Only the one-shot exchange is supported. Tokens are never refreshed here;
//! the caller passes a fresh bearer token to each session.

use anyhow::{Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Simulation token endpoint.
pub const SIM_TOKEN_URL: &str = "https://sim.logonvalidation.net/token";

/// Tokens issued for an authorization code.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_token: String,
    pub refresh_token_expires_in: u64,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token_expires_in", &self.refresh_token_expires_in)
            .finish_non_exhaustive()
    }
}

/// Application credentials plus the endpoint to exchange codes at.
pub struct CodeExchange {
    http: Client,
    token_url: String,
    redirect_uri: String,
    client_id: SecretString,
    client_secret: SecretString,
}

impl CodeExchange {
    pub fn new(
        token_url: impl Into<String>,
        redirect_uri: impl Into<String>,
        client_id: SecretString,
        client_secret: SecretString,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build token HTTP client")?;
        Ok(Self {
            http,
            token_url: token_url.into(),
            redirect_uri: redirect_uri.into(),
            client_id,
            client_secret,
        })
    }

    /// Trade an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        debug!(url = %self.token_url, "Exchanging authorization code");

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.expose_secret().as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let resp = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .context("Token endpoint request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Token endpoint error {status}: {body}");
        }

        let tokens: TokenResponse = resp
            .json()
            .await
            .context("Failed to parse token response")?;

        info!(expires_in = tokens.expires_in, "Access token issued");
        Ok(tokens)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
