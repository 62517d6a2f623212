use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::http::{Context, HttpMethod};
use crate::params::{impl_request_params, GetParams, ListParams, Params, RequestParams};
use crate::resources::payment::PaymentList;
use crate::types::{impl_response_holder, Collection, Notes, Response};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    #[serde(skip)]
    pub response: Response,
    pub id: String,
    pub entity: String,
    pub created_at: i64,
    /// In the currency's smallest unit.
    pub amount: i64,
    pub amount_paid: i64,
    pub amount_due: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub offer_id: Option<String>,
    /// `created`, `attempted` or `paid`.
    pub status: String,
    pub attempts: i64,
    pub notes: Notes,
}

pub type OrderList = Collection<Order>;

/// Params for creating or updating an order. Updates only accept `notes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderParams {
    #[serde(skip)]
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_payment: Option<bool>,
    #[serde(skip_serializing_if = "Notes::is_empty")]
    pub notes: Notes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderListParams {
    #[serde(flatten)]
    pub list: ListParams,
    /// `1` restricts the list to orders with an authorized payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

impl_request_params! {
    OrderParams => params,
    OrderListParams => list.params,
}
impl_response_holder!(Order);

/// `/orders` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Orders<'a> {
    client: &'a Client,
}

impl<'a> Orders<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn create(&self, ctx: &Context, params: &OrderParams) -> Result<Order> {
        let mut order = Order::default();
        self.client
            .call(ctx, HttpMethod::Post, "/orders", Some(params), Some(&mut order))?;
        Ok(order)
    }

    pub fn update(&self, ctx: &Context, id: &str, params: &OrderParams) -> Result<Order> {
        let mut order = Order::default();
        let path = format!("/orders/{id}");
        self.client
            .call(ctx, HttpMethod::Patch, &path, Some(params), Some(&mut order))?;
        Ok(order)
    }

    pub fn get(&self, ctx: &Context, id: &str, params: Option<&GetParams>) -> Result<Order> {
        let mut order = Order::default();
        let path = format!("/orders/{id}");
        self.client.call(
            ctx,
            HttpMethod::Get,
            &path,
            params.map(|p| p as &dyn RequestParams),
            Some(&mut order),
        )?;
        Ok(order)
    }

    pub fn list(&self, ctx: &Context, params: Option<&OrderListParams>) -> Result<OrderList> {
        let mut list = OrderList::default();
        self.client.call(
            ctx,
            HttpMethod::Get,
            "/orders",
            params.map(|p| p as &dyn RequestParams),
            Some(&mut list),
        )?;
        Ok(list)
    }

    /// Payments made against an order.
    pub fn payments(&self, ctx: &Context, order_id: &str) -> Result<PaymentList> {
        let mut list = PaymentList::default();
        let path = format!("/orders/{order_id}/payments");
        self.client
            .call(ctx, HttpMethod::Get, &path, None, Some(&mut list))?;
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_query;

    #[test]
    fn order_decodes() {
        let raw = r#"{"id":"order_DBJOWzybf0sJbb","entity":"order","amount":50000,"amount_paid":0,"amount_due":50000,"currency":"INR","receipt":"rcptid_11","offer_id":null,"status":"created","attempts":0,"notes":[],"created_at":1566986570}"#;
        let order: Order = serde_json::from_str(raw).unwrap();
        assert_eq!(order.amount, 50000);
        assert_eq!(order.receipt.as_deref(), Some("rcptid_11"));
        assert_eq!(order.offer_id, None);
        assert_eq!(order.status, "created");
    }

    #[test]
    fn list_params_flatten_into_query() {
        let params = OrderListParams {
            list: ListParams {
                count: Some(5),
                ..Default::default()
            },
            authorized: Some(1),
            receipt: None,
        };
        let query = encode_query(&params.to_value().unwrap()).unwrap();
        assert_eq!(query, "authorized=1&count=5");
    }

    #[test]
    fn list_params_headers_come_from_inner_params() {
        let mut params = OrderListParams::default();
        params.list.params.set_header("X-Razorpay-Account", "acc_1");
        assert_eq!(params.headers().len(), 1);
    }
}
