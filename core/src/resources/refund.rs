use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::http::{Context, HttpMethod};
use crate::params::{impl_request_params, GetParams, ListParams, Params, RequestParams};
use crate::types::{impl_response_holder, Collection, Notes, Response};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Refund {
    #[serde(skip)]
    pub response: Response,
    pub id: String,
    pub entity: String,
    pub created_at: i64,
    pub amount: i64,
    pub currency: String,
    pub payment_id: String,
    pub receipt: Option<String>,
    /// Acquirer reference numbers such as `arn` or `rrn`; `null` until known.
    pub acquirer_data: BTreeMap<String, Option<String>>,
    /// `pending`, `processed` or `failed`.
    pub status: String,
    pub speed_processed: Option<String>,
    pub speed_requested: Option<String>,
    pub notes: Notes,
}

pub type RefundList = Collection<Refund>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefundCreateParams {
    #[serde(skip)]
    pub params: Params,
    /// Omit for a full refund.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    /// `normal` or `optimum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(skip_serializing_if = "Notes::is_empty")]
    pub notes: Notes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefundUpdateParams {
    #[serde(skip)]
    pub params: Params,
    #[serde(skip_serializing_if = "Notes::is_empty")]
    pub notes: Notes,
}

impl_request_params! {
    RefundCreateParams => params,
    RefundUpdateParams => params,
}
impl_response_holder!(Refund);

/// `/refunds` endpoints. Refunds are created through `Payments::create_refund`.
#[derive(Debug, Clone, Copy)]
pub struct Refunds<'a> {
    client: &'a Client,
}

impl<'a> Refunds<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn update(&self, ctx: &Context, id: &str, params: &RefundUpdateParams) -> Result<Refund> {
        let mut refund = Refund::default();
        let path = format!("/refunds/{id}");
        self.client
            .call(ctx, HttpMethod::Patch, &path, Some(params), Some(&mut refund))?;
        Ok(refund)
    }

    pub fn get(&self, ctx: &Context, id: &str, params: Option<&GetParams>) -> Result<Refund> {
        let mut refund = Refund::default();
        let path = format!("/refunds/{id}");
        self.client.call(
            ctx,
            HttpMethod::Get,
            &path,
            params.map(|p| p as &dyn RequestParams),
            Some(&mut refund),
        )?;
        Ok(refund)
    }

    pub fn list(&self, ctx: &Context, params: Option<&ListParams>) -> Result<RefundList> {
        let mut list = RefundList::default();
        self.client.call(
            ctx,
            HttpMethod::Get,
            "/refunds",
            params.map(|p| p as &dyn RequestParams),
            Some(&mut list),
        )?;
        Ok(list)
    }
}
