use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::http::{Context, HttpMethod};
use crate::params::{impl_request_params, GetParams, ListParams, Params, RequestParams};
use crate::resources::refund::{Refund, RefundCreateParams, RefundList};
use crate::types::{impl_response_holder, Collection, Notes, Response};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payment {
    #[serde(skip)]
    pub response: Response,
    pub id: String,
    pub entity: String,
    pub created_at: i64,
    pub amount: i64,
    pub currency: String,
    /// `created`, `authorized`, `captured`, `refunded` or `failed`.
    pub status: String,
    pub method: String,
    pub order_id: Option<String>,
    pub description: Option<String>,
    pub international: bool,
    pub amount_refunded: i64,
    pub refund_status: Option<String>,
    pub captured: bool,
    pub card_id: Option<String>,
    pub bank: Option<String>,
    pub wallet: Option<String>,
    pub vpa: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub notes: Notes,
    pub fee: Option<i64>,
    pub tax: Option<i64>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

pub type PaymentList = Collection<Payment>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    #[serde(skip)]
    pub response: Response,
    pub id: String,
    pub entity: String,
    pub name: String,
    pub last4: String,
    pub network: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub issuer: Option<String>,
    pub international: bool,
    pub emi: bool,
}

/// Only `notes` can be changed on an existing payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentUpdateParams {
    #[serde(skip)]
    pub params: Params,
    #[serde(skip_serializing_if = "Notes::is_empty")]
    pub notes: Notes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentCaptureParams {
    #[serde(skip)]
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl_request_params! {
    PaymentUpdateParams => params,
    PaymentCaptureParams => params,
}
impl_response_holder!(Payment, Card);

/// `/payments` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Payments<'a> {
    client: &'a Client,
}

impl<'a> Payments<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn update(&self, ctx: &Context, id: &str, params: &PaymentUpdateParams) -> Result<Payment> {
        let mut payment = Payment::default();
        let path = format!("/payments/{id}");
        self.client
            .call(ctx, HttpMethod::Patch, &path, Some(params), Some(&mut payment))?;
        Ok(payment)
    }

    /// Capture an authorized payment.
    pub fn capture(&self, ctx: &Context, id: &str, params: &PaymentCaptureParams) -> Result<Payment> {
        let mut payment = Payment::default();
        let path = format!("/payments/{id}/capture");
        self.client
            .call(ctx, HttpMethod::Post, &path, Some(params), Some(&mut payment))?;
        Ok(payment)
    }

    pub fn get(&self, ctx: &Context, id: &str, params: Option<&GetParams>) -> Result<Payment> {
        let mut payment = Payment::default();
        let path = format!("/payments/{id}");
        self.client.call(
            ctx,
            HttpMethod::Get,
            &path,
            params.map(|p| p as &dyn RequestParams),
            Some(&mut payment),
        )?;
        Ok(payment)
    }

    pub fn list(&self, ctx: &Context, params: Option<&ListParams>) -> Result<PaymentList> {
        let mut list = PaymentList::default();
        self.client.call(
            ctx,
            HttpMethod::Get,
            "/payments",
            params.map(|p| p as &dyn RequestParams),
            Some(&mut list),
        )?;
        Ok(list)
    }

    pub fn card(&self, ctx: &Context, payment_id: &str) -> Result<Card> {
        let mut card = Card::default();
        let path = format!("/payments/{payment_id}/card");
        self.client
            .call(ctx, HttpMethod::Get, &path, None, Some(&mut card))?;
        Ok(card)
    }

    /// Refund a captured payment, fully or partially.
    pub fn create_refund(
        &self,
        ctx: &Context,
        payment_id: &str,
        params: &RefundCreateParams,
    ) -> Result<Refund> {
        let mut refund = Refund::default();
        let path = format!("/payments/{payment_id}/refund");
        self.client
            .call(ctx, HttpMethod::Post, &path, Some(params), Some(&mut refund))?;
        Ok(refund)
    }

    pub fn refunds(&self, ctx: &Context, payment_id: &str) -> Result<RefundList> {
        let mut list = RefundList::default();
        let path = format!("/payments/{payment_id}/refunds");
        self.client
            .call(ctx, HttpMethod::Get, &path, None, Some(&mut list))?;
        Ok(list)
    }
}
