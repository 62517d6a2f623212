//! Blocking client core for the Razorpay payments REST API.
//!
//! # Overview
//! A `Client` turns typed params into an authenticated `HttpRequest`, hands it
//! to a pluggable `Transport` and decodes the `HttpResponse` into a typed
//! entity or an `Error`. Signature helpers verify checkout callbacks and
//! webhooks without any network access.
//!
//! # Design
//! - Encoding (`encoder`) and decoding (`decoder`) are pure functions of their
//!   inputs; only `transport` performs I/O.
//! - `Backend` is the seam between the credentialed `Client` and the
//!   encode/execute/decode pipeline, so tests can replace either the whole
//!   pipeline or just the transport.
//! - Every successful call keeps the raw body next to the typed fields.
//! - Nothing is global: build a `Config`, build a `Client`, clone it freely.

pub mod backend;
pub mod client;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod http;
pub mod params;
pub mod resources;
pub mod signature;
pub mod transport;
pub mod types;

pub use backend::{ApiBackend, Backend};
pub use client::Client;
pub use config::Config;
pub use decoder::decode_response;
pub use encoder::RequestEncoder;
pub use error::{ApiError, Error, Result};
pub use http::{Context, HttpMethod, HttpRequest, HttpResponse};
pub use params::{GetParams, ListParams, Params, RequestParams};
pub use signature::{verify_payment_signature, verify_webhook_request, verify_webhook_signature};
pub use transport::{Transport, UreqTransport};
pub use types::{Collection, Notes, Response, ResponseHolder};
