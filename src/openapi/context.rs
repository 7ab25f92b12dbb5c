//! Per-call request state.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::types::Result;

/// Everything one dispatch needs. Built per call and never shared.
#[derive(Clone)]
pub struct RequestContext {
    base_url: String,
    token: SecretString,
    pub client_key: Option<String>,
    pub account_key: Option<String>,
    pub params: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
    body_object: Option<serde_json::Value>,
}

impl RequestContext {
    /// `base_url` gains a trailing `/` if it lacks one so that relative
    /// endpoint paths join beneath it.
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            token,
            client_key: None,
            account_key: None,
            params: BTreeMap::new(),
            body: None,
            body_object: None,
        }
    }

    pub fn with_client_key(mut self, key: Option<&str>) -> Self {
        self.client_key = key.map(str::to_string);
        self
    }

    pub fn with_account_key(mut self, key: Option<&str>) -> Self {
        self.account_key = key.map(str::to_string);
        self
    }

    /// Set one addressing parameter, replacing any previous value.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merge a projected parameter map. Later values win.
    pub fn params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn set_raw_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }

    /// Attach a body object. It takes precedence over any raw body.
    pub fn set_body_object<T: Serialize>(&mut self, body: &T) -> Result<()> {
        self.body_object = Some(serde_json::to_value(body)?);
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// The bytes to send: the serialized body object if one is set,
    /// otherwise the raw body.
    pub fn resolve_body(&self) -> Result<Option<Vec<u8>>> {
        match &self.body_object {
            Some(obj) => Ok(Some(serde_json::to_vec(obj)?)),
            None => Ok(self.body.clone()),
        }
    }

    /// Parameters plus non-empty session keys, explicit values first.
    pub fn addressing(&self) -> BTreeMap<String, String> {
        let mut merged = self.params.clone();
        let keys = [
            ("ClientKey", &self.client_key),
            ("AccountKey", &self.account_key),
        ];
        for (name, key) in keys {
            if let Some(key) = key.as_deref().filter(|k| !k.is_empty()) {
                merged
                    .entry(name.to_string())
                    .or_insert_with(|| key.to_string());
            }
        }
        merged
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("base_url", &self.base_url)
            .field("client_key", &self.client_key)
            .field("account_key", &self.account_key)
            .field("params", &self.params)
            .field("has_body", &(self.body.is_some() || self.body_object.is_some()))
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
