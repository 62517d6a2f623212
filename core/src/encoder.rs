//! Turns a method, versioned path and params object into an `HttpRequest`.

use serde_json::Value;
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::params::RequestParams;

pub const USER_AGENT: &str = concat!("razorpay-rust/", env!("CARGO_PKG_VERSION"));

/// Builds requests against a fixed host.
#[derive(Debug, Clone)]
pub struct RequestEncoder {
    host: String,
}

impl RequestEncoder {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// `path` is already version-prefixed, e.g. `v1/orders`.
    ///
    /// Read-only verbs get the params as a query string, all others as a
    /// JSON body. `authorization`, `Content-Type` and `User-Agent` win over
    /// caller headers of the same name.
    pub fn encode(
        &self,
        method: HttpMethod,
        path: &str,
        params: &dyn RequestParams,
        authorization: Option<&str>,
    ) -> Result<HttpRequest> {
        let value = params.to_value().map_err(|e| Error::Encoding(e.to_string()))?;

        let mut url = format!("{}/{}", self.host, path.trim_start_matches('/'));
        let body = if method.is_read_only() {
            let query = encode_query(&value)?;
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query);
            }
            None
        } else {
            let body = match value {
                Value::Null => Value::Object(serde_json::Map::new()),
                Value::Object(_) => value,
                other => {
                    return Err(Error::Encoding(format!(
                        "params must serialize to a JSON object, got {other}"
                    )))
                }
            };
            Some(serde_json::to_string(&body).map_err(|e| Error::Encoding(e.to_string()))?)
        };

        let mut headers: Vec<(String, String)> = params
            .headers()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(authorization) = authorization {
            set_header(&mut headers, "Authorization", authorization);
        }
        if !method.is_read_only() {
            set_header(&mut headers, "Content-Type", "application/json");
        }
        set_header(&mut headers, "User-Agent", USER_AGENT);

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

/// Replace any same-named header (case-insensitive), then append.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}

/// Flatten a params object into `application/x-www-form-urlencoded` pairs.
///
/// `null` fields are dropped, arrays become repeated keys, scalars use their
/// JSON text form. Nested objects have no query representation.
pub fn encode_query(value: &Value) -> Result<String> {
    let map = match value {
        Value::Null => return Ok(String::new()),
        Value::Object(map) => map,
        other => {
            return Err(Error::Encoding(format!(
                "params must serialize to a JSON object, got {other}"
            )))
        }
    };

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(key, item)? {
                        serializer.append_pair(key, &text);
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(key, other)? {
                    serializer.append_pair(key, &text);
                }
            }
        }
    }
    Ok(serializer.finish())
}

fn scalar_text(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => Err(Error::Encoding(format!(
            "field `{key}` cannot be encoded as a query parameter"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{GetParams, ListParams, Params};
    use serde_json::json;

    fn encoder() -> RequestEncoder {
        RequestEncoder::new("https://api.razorpay.com/")
    }

    #[test]
    fn get_without_params_has_no_query() {
        let req = encoder()
            .encode(HttpMethod::Get, "v1/orders", &Params::new(), Some("Basic x"))
            .unwrap();
        assert_eq!(req.url, "https://api.razorpay.com/v1/orders");
        assert!(req.body.is_none());
        assert_eq!(req.header("authorization"), Some("Basic x"));
        assert_eq!(req.header("content-type"), None);
        assert_eq!(req.header("user-agent"), Some(USER_AGENT));
    }

    #[test]
    fn get_flattens_params_into_query() {
        let params = ListParams {
            count: Some(2),
            skip: Some(0),
            expand: vec!["card".to_string(), "emi".to_string()],
            ..Default::default()
        };
        let req = encoder()
            .encode(HttpMethod::Get, "v1/payments", &params, None)
            .unwrap();
        let (_, query) = req.url.split_once('?').unwrap();
        let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("count".to_string(), "2".to_string()),
                ("expand[]".to_string(), "card".to_string()),
                ("expand[]".to_string(), "emi".to_string()),
                ("skip".to_string(), "0".to_string()),
            ]
        );
        assert!(!query.contains("from"));
        assert!(!query.contains("to="));
    }

    #[test]
    fn post_serializes_json_body() {
        let params = GetParams::default();
        let req = encoder()
            .encode(HttpMethod::Post, "/v1/payment_links/plink_1/cancel", &params, None)
            .unwrap();
        assert_eq!(req.url, "https://api.razorpay.com/v1/payment_links/plink_1/cancel");
        assert_eq!(req.body.as_deref(), Some("{}"));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn fixed_headers_override_caller_headers() {
        let mut params = Params::new();
        params.set_header("authorization", "Bearer nope");
        params.set_header("user-agent", "custom");
        params.set_header("X-Razorpay-Account", "acc_1");
        let req = encoder()
            .encode(HttpMethod::Patch, "v1/orders/order_1", &params, Some("Basic ok"))
            .unwrap();
        assert_eq!(req.header("Authorization"), Some("Basic ok"));
        assert_eq!(req.header("User-Agent"), Some(USER_AGENT));
        assert_eq!(req.header("X-Razorpay-Account"), Some("acc_1"));
        assert_eq!(
            req.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
                .count(),
            1
        );
    }

    #[test]
    fn query_escapes_values() {
        let query = encode_query(&json!({"receipt": "a b&c", "authorized": true})).unwrap();
        assert_eq!(query, "authorized=true&receipt=a+b%26c");
    }

    #[test]
    fn nested_object_cannot_be_a_query() {
        let err = encode_query(&json!({"notes": {"a": "1"}})).unwrap_err();
        assert!(matches!(err, Error::Encoding(msg) if msg.contains("notes")));
    }

    #[test]
    fn non_object_params_are_rejected() {
        let err = encode_query(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
