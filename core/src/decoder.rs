//! Interprets an `HttpResponse`: status classification, structured errors
//! and typed decoding into a `ResponseHolder`.

use serde::Deserialize;
use tracing::warn;

use crate::error::{ApiError, Error, Result};
use crate::http::HttpResponse;
use crate::types::ResponseHolder;

/// Only 200 counts as success; any other status is an error.
pub const SUCCESS_STATUS: u16 = 200;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// Decode `response` into `holder`, or into an `Error`.
///
/// With a holder, the raw body is stored before typed decoding is attempted.
/// Without one, the body of a 200 is ignored.
pub fn decode_response(
    response: HttpResponse,
    holder: Option<&mut dyn ResponseHolder>,
) -> Result<()> {
    let HttpResponse { status, body, .. } = response;

    if status != SUCCESS_STATUS {
        return Err(decode_error(status, body));
    }

    let Some(holder) = holder else {
        return Ok(());
    };
    holder.set_body(body.clone());
    holder.decode(&body).map_err(|source| {
        warn!(status, error = %source, "success body did not match the expected shape");
        Error::MalformedResponse {
            status,
            body,
            source,
        }
    })
}

fn decode_error(status: u16, body: Vec<u8>) -> Error {
    match serde_json::from_slice::<ErrorEnvelope>(&body) {
        Ok(ErrorEnvelope { mut error }) => {
            warn!(status, code = %error.code, "api returned an error");
            error.status = status;
            error.body = body;
            Error::Api(error)
        }
        Err(source) => {
            warn!(status, error = %source, "error body did not match the expected shape");
            Error::MalformedResponse {
                status,
                body,
                source,
            }
        }
    }
}
