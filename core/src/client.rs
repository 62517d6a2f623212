//! Credentialed entry point for every API call.
//!
//! # Design
//! `Client` holds the API version, the key pair and a `Backend`. It carries no
//! mutable state between calls and clones share the backend, so a single
//! instance built at startup can be handed to any number of threads. There is
//! no process-wide default client; callers own the one they build.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;

use crate::backend::{ApiBackend, Backend};
use crate::config::Config;
use crate::error::Result;
use crate::http::{Context, HttpMethod};
use crate::params::{Params, RequestParams};
use crate::resources::{Customers, Orders, PaymentLinks, Payments, Refunds};
use crate::signature;
use crate::transport::{Transport, UreqTransport};
use crate::types::ResponseHolder;

#[derive(Clone)]
pub struct Client {
    api_version: String,
    key_id: String,
    key_secret: String,
    authorization: String,
    backend: Arc<dyn Backend>,
}

impl Client {
    /// Client on the default `ureq` transport.
    pub fn new(config: Config) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, Arc::new(transport))
    }

    /// Client on a caller-supplied transport (connection pooling, retries,
    /// test doubles).
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        let backend = ApiBackend::new(&config.host, transport);
        Self::with_backend(config, Arc::new(backend))
    }

    /// Client on a caller-supplied backend. `config.host` and
    /// `config.timeout` are the backend's business and ignored here.
    pub fn with_backend(config: Config, backend: Arc<dyn Backend>) -> Self {
        let credentials = format!("{}:{}", config.key_id, config.key_secret);
        let authorization = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        );
        Self {
            api_version: config.api_version,
            key_id: config.key_id,
            key_secret: config.key_secret,
            authorization,
            backend,
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Value of the `Authorization` header sent with every call.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// Perform one call. `path` is relative to the API version, e.g.
    /// `/orders`. Missing params are sent as an empty object; a missing
    /// holder discards the success body.
    pub fn call(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        params: Option<&dyn RequestParams>,
        holder: Option<&mut dyn ResponseHolder>,
    ) -> Result<()> {
        let empty = Params::new();
        let params = params.unwrap_or(&empty);
        let path = format!("{}/{}", self.api_version, path.trim_start_matches('/'));
        self.backend.call(
            ctx,
            method,
            &path,
            params,
            Some(&self.authorization),
            holder,
        )
    }

    /// Verify a checkout callback with this client's key secret.
    pub fn verify_payment_signature(&self, fields: &HashMap<String, String>) -> Result<bool> {
        signature::verify_payment_signature(fields, &self.key_secret)
    }

    pub fn customers(&self) -> Customers<'_> {
        Customers::new(self)
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders::new(self)
    }

    pub fn payments(&self) -> Payments<'_> {
        Payments::new(self)
    }

    pub fn refunds(&self) -> Refunds<'_> {
        Refunds::new(self)
    }

    pub fn payment_links(&self) -> PaymentLinks<'_> {
        PaymentLinks::new(self)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_version", &self.api_version)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
