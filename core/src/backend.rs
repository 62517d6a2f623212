//! One API call: encode, execute, decode.
//!
//! # Design
//! `Backend` is the seam a test can replace wholesale to fake the API
//! without any HTTP at all. `ApiBackend` is the real pipeline; it holds only
//! immutable state, so one instance serves any number of threads.

use std::sync::Arc;

use tracing::debug;

use crate::decoder::decode_response;
use crate::encoder::RequestEncoder;
use crate::error::Result;
use crate::http::{Context, HttpMethod};
use crate::params::RequestParams;
use crate::transport::Transport;
use crate::types::ResponseHolder;

/// Performs one API call given a method, path, params and optional holder.
pub trait Backend: Send + Sync {
    /// `path` is already version-prefixed (e.g. `v1/orders`); authentication
    /// arrives through `authorization`.
    fn call(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        params: &dyn RequestParams,
        authorization: Option<&str>,
        holder: Option<&mut dyn ResponseHolder>,
    ) -> Result<()>;
}

/// Backend that talks HTTP through a `Transport`.
#[derive(Clone)]
pub struct ApiBackend {
    encoder: RequestEncoder,
    transport: Arc<dyn Transport>,
}

impl ApiBackend {
    pub fn new(host: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            encoder: RequestEncoder::new(host),
            transport,
        }
    }

    pub fn host(&self) -> &str {
        self.encoder.host()
    }
}

impl Backend for ApiBackend {
    fn call(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        params: &dyn RequestParams,
        authorization: Option<&str>,
        holder: Option<&mut dyn ResponseHolder>,
    ) -> Result<()> {
        let request = self.encoder.encode(method, path, params, authorization)?;
        debug!(%method, path, "dispatching request");

        let response = self.transport.execute(ctx, request)?;
        debug!(%method, path, status = response.status, "received response");

        decode_response(response, holder)
    }
}

impl std::fmt::Debug for ApiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiBackend")
            .field("host", &self.encoder.host())
            .finish_non_exhaustive()
    }
}
