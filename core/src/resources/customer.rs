use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::http::{Context, HttpMethod};
use crate::params::{impl_request_params, GetParams, ListParams, Params, RequestParams};
use crate::types::{impl_response_holder, Collection, Notes, Response};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    #[serde(skip)]
    pub response: Response,
    pub id: String,
    pub entity: String,
    pub created_at: i64,
    pub name: String,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub gstin: Option<String>,
    pub notes: Notes,
}

pub type CustomerList = Collection<Customer>;

/// Params for creating or editing a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerParams {
    #[serde(skip)]
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    /// Create only: return the existing customer instead of failing when
    /// one with the same contact and email exists. Sent as `"0"`/`"1"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_existing: Option<String>,
    #[serde(skip_serializing_if = "Notes::is_empty")]
    pub notes: Notes,
}

impl_request_params!(CustomerParams => params);
impl_response_holder!(Customer);

/// `/customers` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Customers<'a> {
    client: &'a Client,
}

impl<'a> Customers<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn create(&self, ctx: &Context, params: &CustomerParams) -> Result<Customer> {
        let mut customer = Customer::default();
        self.client
            .call(ctx, HttpMethod::Post, "/customers", Some(params), Some(&mut customer))?;
        Ok(customer)
    }

    /// Customers are edited with `PUT`.
    pub fn update(&self, ctx: &Context, id: &str, params: &CustomerParams) -> Result<Customer> {
        let mut customer = Customer::default();
        let path = format!("/customers/{id}");
        self.client
            .call(ctx, HttpMethod::Put, &path, Some(params), Some(&mut customer))?;
        Ok(customer)
    }

    pub fn get(&self, ctx: &Context, id: &str, params: Option<&GetParams>) -> Result<Customer> {
        let mut customer = Customer::default();
        let path = format!("/customers/{id}");
        self.client.call(
            ctx,
            HttpMethod::Get,
            &path,
            params.map(|p| p as &dyn RequestParams),
            Some(&mut customer),
        )?;
        Ok(customer)
    }

    pub fn list(&self, ctx: &Context, params: Option<&ListParams>) -> Result<CustomerList> {
        let mut list = CustomerList::default();
        self.client.call(
            ctx,
            HttpMethod::Get,
            "/customers",
            params.map(|p| p as &dyn RequestParams),
            Some(&mut list),
        )?;
        Ok(list)
    }
}
