use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::http::{Context, HttpMethod};
use crate::params::{impl_request_params, GetParams, ListParams, Params, RequestParams};
use crate::resources::customer::{Customer, CustomerParams};
use crate::types::{impl_response_holder, object_or_empty, Collection, Notes, Response};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentLink {
    #[serde(skip)]
    pub response: Response,
    pub id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub amount: i64,
    pub currency: String,
    pub accept_partial: bool,
    pub first_min_partial_amount: i64,
    pub amount_paid: i64,
    pub description: String,
    pub customer: Customer,
    pub callback_method: String,
    pub callback_url: String,
    pub cancelled_at: i64,
    pub expire_by: i64,
    pub expired_at: i64,
    pub notify: PaymentLinkNotify,
    pub reference_id: String,
    pub reminder_enable: bool,
    /// `None` while the API reports reminders as an empty list.
    #[serde(deserialize_with = "object_or_empty")]
    pub reminders: Option<PaymentLinkReminders>,
    /// `None` until the link has been paid at least once.
    pub payments: Option<Vec<PaymentLinkPayment>>,
    pub short_url: String,
    /// `created`, `partially_paid`, `expired`, `cancelled` or `paid`.
    pub status: String,
    pub notes: Notes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentLinkNotify {
    pub email: bool,
    pub sms: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentLinkReminders {
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentLinkPayment {
    pub payment_id: String,
    pub plink_id: String,
    pub amount: i64,
    pub method: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Listed under `payment_links` rather than `items`; `Collection` accepts
/// both.
pub type PaymentLinkList = Collection<PaymentLink>;

/// Params for creating or updating a payment link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentLinkParams {
    #[serde(skip)]
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_partial: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_min_partial_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<PaymentLinkNotifyParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_enable: Option<bool>,
    #[serde(skip_serializing_if = "Notes::is_empty")]
    pub notes: Notes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentLinkNotifyParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentLinkListParams {
    #[serde(flatten)]
    pub list: ListParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

impl_request_params! {
    PaymentLinkParams => params,
    PaymentLinkListParams => list.params,
}
impl_response_holder!(PaymentLink);

/// Channel for (re)sending a payment link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMedium {
    Sms,
    Email,
}

impl NotifyMedium {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifyMedium::Sms => "sms",
            NotifyMedium::Email => "email",
        }
    }
}

impl fmt::Display for NotifyMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `/payment_links` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct PaymentLinks<'a> {
    client: &'a Client,
}

impl<'a> PaymentLinks<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn create(&self, ctx: &Context, params: &PaymentLinkParams) -> Result<PaymentLink> {
        let mut link = PaymentLink::default();
        self.client
            .call(ctx, HttpMethod::Post, "/payment_links", Some(params), Some(&mut link))?;
        Ok(link)
    }

    pub fn update(&self, ctx: &Context, id: &str, params: &PaymentLinkParams) -> Result<PaymentLink> {
        let mut link = PaymentLink::default();
        let path = format!("/payment_links/{id}");
        self.client
            .call(ctx, HttpMethod::Patch, &path, Some(params), Some(&mut link))?;
        Ok(link)
    }

    pub fn get(&self, ctx: &Context, id: &str, params: Option<&GetParams>) -> Result<PaymentLink> {
        let mut link = PaymentLink::default();
        let path = format!("/payment_links/{id}");
        self.client.call(
            ctx,
            HttpMethod::Get,
            &path,
            params.map(|p| p as &dyn RequestParams),
            Some(&mut link),
        )?;
        Ok(link)
    }

    pub fn list(
        &self,
        ctx: &Context,
        params: Option<&PaymentLinkListParams>,
    ) -> Result<PaymentLinkList> {
        let mut list = PaymentLinkList::default();
        self.client.call(
            ctx,
            HttpMethod::Get,
            "/payment_links",
            params.map(|p| p as &dyn RequestParams),
            Some(&mut list),
        )?;
        Ok(list)
    }

    /// Send or resend the link. The response body carries nothing useful.
    pub fn notify(&self, ctx: &Context, id: &str, medium: NotifyMedium) -> Result<()> {
        let path = format!("/payment_links/{id}/notify_by/{medium}");
        self.client.call(ctx, HttpMethod::Post, &path, None, None)
    }

    pub fn cancel(&self, ctx: &Context, id: &str) -> Result<PaymentLink> {
        let mut link = PaymentLink::default();
        let path = format!("/payment_links/{id}/cancel");
        self.client
            .call(ctx, HttpMethod::Post, &path, None, Some(&mut link))?;
        Ok(link)
    }
}
