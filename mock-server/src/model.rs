//! Wire shapes served by the mock and the in-memory store behind them.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::{ApiError, AUTHORIZED_PAYMENT_ID, CAPTURED_PAYMENT_ID, SEEDED_ORDER_ID};

pub type Notes = BTreeMap<String, String>;

/// Upstream ids: a resource prefix and 14 characters.
pub fn new_id(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &random[..14])
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Empty notes go out as `[]`.
fn notes_or_empty_list<S: Serializer>(notes: &Notes, serializer: S) -> Result<S::Ok, S::Error> {
    if notes.is_empty() {
        serializer.collect_seq(std::iter::empty::<&str>())
    } else {
        notes.serialize(serializer)
    }
}

fn some_or_empty_list<T: Serialize, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => value.serialize(serializer),
        None => serializer.collect_seq(std::iter::empty::<&str>()),
    }
}

pub trait Entity {
    fn id(&self) -> &str;
    fn created_at(&self) -> i64;
}

macro_rules! impl_entity {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn created_at(&self) -> i64 {
                    self.created_at
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: String,
    pub entity: &'static str,
    pub name: String,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub gstin: Option<String>,
    #[serde(serialize_with = "notes_or_empty_list")]
    pub notes: Notes,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: String,
    pub entity: &'static str,
    pub amount: i64,
    pub amount_paid: i64,
    pub amount_due: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub offer_id: Option<String>,
    pub status: &'static str,
    pub attempts: i64,
    #[serde(serialize_with = "notes_or_empty_list")]
    pub notes: Notes,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: String,
    pub entity: &'static str,
    pub name: String,
    pub last4: String,
    pub network: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub issuer: Option<String>,
    pub international: bool,
    pub emi: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: String,
    pub entity: &'static str,
    pub amount: i64,
    pub currency: String,
    pub status: &'static str,
    pub order_id: Option<String>,
    pub invoice_id: Option<String>,
    pub international: bool,
    pub method: &'static str,
    pub amount_refunded: i64,
    pub refund_status: Option<&'static str>,
    pub captured: bool,
    pub description: Option<String>,
    pub card_id: Option<String>,
    pub bank: Option<String>,
    pub wallet: Option<String>,
    pub vpa: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    #[serde(serialize_with = "notes_or_empty_list")]
    pub notes: Notes,
    pub fee: Option<i64>,
    pub tax: Option<i64>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
    pub created_at: i64,
    #[serde(skip)]
    pub card: Option<Card>,
}

impl Payment {
    pub fn refundable(&self) -> i64 {
        self.amount - self.amount_refunded
    }

    fn seed(id: &str, amount: i64, status: &'static str, method: &'static str, created_at: i64) -> Self {
        Self {
            id: id.to_string(),
            entity: "payment",
            amount,
            currency: "INR".to_string(),
            status,
            order_id: Some(SEEDED_ORDER_ID.to_string()),
            invoice_id: None,
            international: false,
            method,
            amount_refunded: 0,
            refund_status: None,
            captured: false,
            description: Some("Seeded payment".to_string()),
            card_id: None,
            bank: None,
            wallet: None,
            vpa: None,
            email: Some("gaurav.kumar@example.com".to_string()),
            contact: Some("+919999999999".to_string()),
            notes: Notes::new(),
            fee: None,
            tax: None,
            error_code: None,
            error_description: None,
            created_at,
            card: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Refund {
    pub id: String,
    pub entity: &'static str,
    pub amount: i64,
    pub currency: String,
    pub payment_id: String,
    pub receipt: Option<String>,
    pub acquirer_data: BTreeMap<String, Option<String>>,
    pub status: &'static str,
    pub speed_processed: String,
    pub speed_requested: String,
    #[serde(serialize_with = "notes_or_empty_list")]
    pub notes: Notes,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinkNotify {
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub sms: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkReminders {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentLink {
    pub id: String,
    pub entity: &'static str,
    pub amount: i64,
    pub amount_paid: i64,
    pub currency: String,
    pub accept_partial: bool,
    pub first_min_partial_amount: i64,
    pub description: String,
    pub customer: LinkCustomer,
    pub callback_url: String,
    pub callback_method: String,
    pub cancelled_at: i64,
    pub expire_by: i64,
    pub expired_at: i64,
    pub notify: LinkNotify,
    pub reference_id: String,
    pub reminder_enable: bool,
    #[serde(serialize_with = "some_or_empty_list")]
    pub reminders: Option<LinkReminders>,
    pub payments: Option<Vec<serde_json::Value>>,
    pub short_url: String,
    pub status: &'static str,
    #[serde(serialize_with = "notes_or_empty_list")]
    pub notes: Notes,
    pub created_at: i64,
    pub updated_at: i64,
}

impl_entity!(Customer, Order, Payment, Refund, PaymentLink);

/// List envelope used by every list route except payment links.
#[derive(Debug, Serialize)]
pub struct Collection<T> {
    pub entity: &'static str,
    pub count: usize,
    pub items: Vec<T>,
}

impl<T> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            entity: "collection",
            count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentLinkCollection {
    pub payment_links: Vec<PaymentLink>,
}

/// Pagination and filters accepted by list routes. Unknown keys such as
/// `expand[]` are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub count: Option<usize>,
    pub skip: Option<usize>,
    pub authorized: Option<u8>,
    pub receipt: Option<String>,
    pub payment_id: Option<String>,
    pub reference_id: Option<String>,
}

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

impl ListQuery {
    /// Newest first, filtered by `from`/`to`, then `skip` and `count`.
    pub fn page<T: Entity + Clone>(&self, items: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
        items
            .iter()
            .rev()
            .filter(|item| self.from.is_none_or(|from| item.created_at() >= from))
            .filter(|item| self.to.is_none_or(|to| item.created_at() <= to))
            .filter(|item| keep(item))
            .skip(self.skip.unwrap_or(0))
            .take(self.count.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE))
            .cloned()
            .collect()
    }
}

// Request bodies. Missing fields are validated by the handlers so that the
// answer is an upstream-shaped error, not an extractor rejection.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub gstin: Option<String>,
    pub fail_existing: Option<String>,
    pub notes: Option<Notes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderInput {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub partial_payment: Option<bool>,
    pub notes: Option<Notes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotesInput {
    pub notes: Option<Notes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CaptureInput {
    pub amount: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RefundInput {
    pub amount: Option<i64>,
    pub receipt: Option<String>,
    pub speed: Option<String>,
    pub notes: Option<Notes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PaymentLinkInput {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub accept_partial: Option<bool>,
    pub first_min_partial_amount: Option<i64>,
    pub description: Option<String>,
    pub customer: Option<LinkCustomer>,
    pub callback_url: Option<String>,
    pub callback_method: Option<String>,
    pub expire_by: Option<i64>,
    pub notify: Option<LinkNotify>,
    pub reference_id: Option<String>,
    pub reminder_enable: Option<bool>,
    pub notes: Option<Notes>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub payments: Vec<Payment>,
    pub refunds: Vec<Refund>,
    pub payment_links: Vec<PaymentLink>,
}

impl Store {
    /// Store holding `SEEDED_ORDER_ID` and the two seeded payments.
    pub fn seeded() -> Self {
        let created_at = now();
        let order = Order {
            id: SEEDED_ORDER_ID.to_string(),
            entity: "order",
            amount: 50_000,
            amount_paid: 0,
            amount_due: 50_000,
            currency: "INR".to_string(),
            receipt: Some("seed_receipt".to_string()),
            offer_id: None,
            status: "attempted",
            attempts: 1,
            notes: Notes::new(),
            created_at,
        };
        let authorized = Payment {
            card_id: Some("card_Seeded00000001".to_string()),
            card: Some(Card {
                id: "card_Seeded00000001".to_string(),
                entity: "card",
                name: "Gaurav Kumar".to_string(),
                last4: "1111".to_string(),
                network: "Visa".to_string(),
                card_type: "credit".to_string(),
                issuer: None,
                international: false,
                emi: false,
            }),
            ..Payment::seed(AUTHORIZED_PAYMENT_ID, 50_000, "authorized", "card", created_at)
        };
        let captured = Payment {
            order_id: None,
            captured: true,
            vpa: Some("gaurav.kumar@exampleupi".to_string()),
            fee: Some(400),
            tax: Some(72),
            ..Payment::seed(CAPTURED_PAYMENT_ID, 20_000, "captured", "upi", created_at)
        };

        Self {
            orders: vec![order],
            payments: vec![authorized, captured],
            ..Self::default()
        }
    }
}

/// Find an entity by id or answer with the upstream "unknown id" error.
pub fn find<'a, T: Entity>(items: &'a [T], id: &str) -> Result<&'a T, ApiError> {
    items
        .iter()
        .find(|item| item.id() == id)
        .ok_or_else(ApiError::unknown_id)
}

pub fn find_mut<'a, T: Entity>(items: &'a mut [T], id: &str) -> Result<&'a mut T, ApiError> {
    items
        .iter_mut()
        .find(|item| item.id() == id)
        .ok_or_else(ApiError::unknown_id)
}
