//! HMAC-SHA256 verification for payment callbacks and webhooks.
//!
//! # Design
//! A signature that simply does not match is `Ok(false)` / `false`. Only a
//! structurally broken input (no `razorpay_signature` field) is an error.
//! Comparison always goes through `subtle::ConstantTimeEq` on the
//! hex-encoded digests.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Field holding the signature in a payment callback.
pub const PAYMENT_SIGNATURE_FIELD: &str = "razorpay_signature";

/// Header holding the signature on a webhook request.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

/// Lowercase hex HMAC-SHA256 of `payload` under `secret`.
pub fn compute_signature(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn is_payload_signature_valid(payload: &[u8], signature: &str, secret: &str) -> bool {
    let expected = compute_signature(payload, secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

/// Verify the signature the checkout hands back after a payment.
///
/// Every field except `razorpay_signature` is signed: values ordered by
/// key, joined with `|`.
pub fn verify_payment_signature(fields: &HashMap<String, String>, secret: &str) -> Result<bool> {
    let signature = fields
        .get(PAYMENT_SIGNATURE_FIELD)
        .ok_or(Error::MissingSignature(PAYMENT_SIGNATURE_FIELD))?;

    let mut keys: Vec<&String> = fields
        .keys()
        .filter(|k| k.as_str() != PAYMENT_SIGNATURE_FIELD)
        .collect();
    keys.sort();
    let payload = keys
        .iter()
        .map(|k| fields[*k].as_str())
        .collect::<Vec<_>>()
        .join("|");

    Ok(is_payload_signature_valid(payload.as_bytes(), signature, secret))
}

/// Verify a webhook body against the `X-Razorpay-Signature` header value.
/// A missing header never verifies.
pub fn verify_webhook_signature(body: &[u8], signature: Option<&str>, secret: &str) -> bool {
    match signature {
        Some(signature) => is_payload_signature_valid(body, signature, secret),
        None => false,
    }
}

/// Verify a webhook whose body is a single-read stream.
///
/// The stream is drained into memory and handed back as a cursor positioned
/// at the start, so the body can still be consumed after verification.
pub fn verify_webhook_reader<R: Read>(
    mut body: R,
    signature: Option<&str>,
    secret: &str,
) -> std::io::Result<(bool, Cursor<Vec<u8>>)> {
    let mut buf = Vec::new();
    body.read_to_end(&mut buf)?;
    let valid = verify_webhook_signature(&buf, signature, secret);
    Ok((valid, Cursor::new(buf)))
}

/// Verify an incoming webhook request.
///
/// Returns the verdict and the same request rebuilt around a replayable
/// body; method, URI, headers and extensions are preserved.
pub fn verify_webhook_request<R: Read>(
    request: http::Request<R>,
    secret: &str,
) -> std::io::Result<(bool, http::Request<Cursor<Vec<u8>>>)> {
    let (parts, body) = request.into_parts();
    let signature = parts
        .headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let (valid, body) = verify_webhook_reader(body, signature, secret)?;
    Ok((valid, http::Request::from_parts(parts, body)))
}
