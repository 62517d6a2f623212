//! Request parameter objects.
//!
//! # Design
//! A params object is a serde struct whose optional fields use
//! `skip_serializing_if = "Option::is_none"`, so "unset" is omitted from both
//! the JSON body and the query string instead of being sent as a zero value.
//! Caller headers ride along in a `Params` field that serde skips.
//!
//! `RequestParams` is object safe so the backend can take `&dyn
//! RequestParams`; `impl_request_params!` wires a struct up to it.

use std::collections::BTreeMap;

use serde::Serialize;

/// What the backend needs from a params object.
pub trait RequestParams {
    /// Extra headers the caller wants on the request.
    fn headers(&self) -> &BTreeMap<String, String>;

    /// The params as a JSON value; expected to be an object or `null`.
    fn to_value(&self) -> serde_json::Result<serde_json::Value>;
}

/// Header overrides carried by every params object. Never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Params {
    #[serde(skip)]
    headers: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

impl RequestParams for Params {
    fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        Ok(serde_json::Value::Object(serde_json::Map::new()))
    }
}

/// Implements `RequestParams` for a serde struct, given the path to its
/// `Params` field.
macro_rules! impl_request_params {
    ($($ty:ty => $($field:ident).+),+ $(,)?) => {
        $(
            impl $crate::params::RequestParams for $ty {
                fn headers(&self) -> &std::collections::BTreeMap<String, String> {
                    self.$($field).+.headers()
                }

                fn to_value(&self) -> serde_json::Result<serde_json::Value> {
                    serde_json::to_value(self)
                }
            }
        )+
    };
}
pub(crate) use impl_request_params;

/// Common params for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    #[serde(skip)]
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(rename = "expand[]", skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<String>,
}

/// Common params for fetching a single entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetParams {
    #[serde(skip)]
    pub params: Params,
    #[serde(rename = "expand[]", skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<String>,
}

impl_request_params! {
    ListParams => params,
    GetParams => params,
}
