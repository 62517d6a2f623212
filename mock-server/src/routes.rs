use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::model::{
    find, find_mut, new_id, now, CaptureInput, Card, Collection, Customer, CustomerInput,
    ListQuery, NotesInput, Order, OrderInput, Payment, PaymentLink,
    PaymentLinkCollection, PaymentLinkInput, Refund, RefundInput,
};
use crate::{ApiError, AppState};

type ApiResult<T> = Result<Json<T>, ApiError>;

const MIN_AMOUNT: i64 = 100;

/// Bodies are parsed by hand so a bad one still gets the error envelope.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("The request body is invalid: {err}")))
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ApiError> {
    value.ok_or_else(|| {
        ApiError::bad_request(format!("The {field} field is required.")).with_field(field)
    })
}

fn check_amount(amount: i64) -> Result<i64, ApiError> {
    if amount < MIN_AMOUNT {
        return Err(ApiError::bad_request("The amount must be atleast INR 1.00").with_field("amount"));
    }
    Ok(amount)
}

// --- customers ---

pub async fn create_customer(State(state): State<AppState>, body: Bytes) -> ApiResult<Customer> {
    let input: CustomerInput = parse_body(&body)?;
    let name = required(input.name, "name")?;
    let mut db = state.db.write().await;

    let has_identity = input.email.is_some() || input.contact.is_some();
    let existing = db
        .customers
        .iter()
        .find(|c| has_identity && c.email == input.email && c.contact == input.contact);
    if let Some(existing) = existing {
        if input.fail_existing.as_deref() == Some("0") {
            return Ok(Json(existing.clone()));
        }
        return Err(ApiError::bad_request("Customer already exists for the merchant"));
    }

    let customer = Customer {
        id: new_id("cust"),
        entity: "customer",
        name,
        email: input.email,
        contact: input.contact,
        gstin: input.gstin,
        notes: input.notes.unwrap_or_default(),
        created_at: now(),
    };
    db.customers.push(customer.clone());
    Ok(Json(customer))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Customer> {
    let input: CustomerInput = parse_body(&body)?;
    let mut db = state.db.write().await;
    let customer = find_mut(&mut db.customers, &id)?;
    if let Some(name) = input.name {
        customer.name = name;
    }
    if input.email.is_some() {
        customer.email = input.email;
    }
    if input.contact.is_some() {
        customer.contact = input.contact;
    }
    if input.gstin.is_some() {
        customer.gstin = input.gstin;
    }
    if let Some(notes) = input.notes {
        customer.notes = notes;
    }
    Ok(Json(customer.clone()))
}

pub async fn get_customer(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Customer> {
    let db = state.db.read().await;
    find(&db.customers, &id).cloned().map(Json)
}

pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Collection<Customer>> {
    let db = state.db.read().await;
    Json(Collection::new(query.page(&db.customers, |_| true)))
}

// --- orders ---

pub async fn create_order(State(state): State<AppState>, body: Bytes) -> ApiResult<Order> {
    let input: OrderInput = parse_body(&body)?;
    let amount = check_amount(required(input.amount, "amount")?)?;
    let currency = required(input.currency, "currency")?;

    let order = Order {
        id: new_id("order"),
        entity: "order",
        amount,
        amount_paid: 0,
        amount_due: amount,
        currency,
        receipt: input.receipt,
        offer_id: None,
        status: "created",
        attempts: 0,
        notes: input.notes.unwrap_or_default(),
        created_at: now(),
    };
    state.db.write().await.orders.push(order.clone());
    Ok(Json(order))
}

/// Only `notes` can change on an order.
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Order> {
    let input: NotesInput = parse_body(&body)?;
    let mut db = state.db.write().await;
    let order = find_mut(&mut db.orders, &id)?;
    if let Some(notes) = input.notes {
        order.notes = notes;
    }
    Ok(Json(order.clone()))
}

pub async fn get_order(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Order> {
    let db = state.db.read().await;
    find(&db.orders, &id).cloned().map(Json)
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Collection<Order>> {
    let db = state.db.read().await;
    let items = query.page(&db.orders, |order| {
        let receipt_matches = query
            .receipt
            .as_ref()
            .is_none_or(|receipt| order.receipt.as_ref() == Some(receipt));
        let authorized_matches = query.authorized != Some(1)
            || db
                .payments
                .iter()
                .any(|p| p.order_id.as_deref() == Some(order.id.as_str()) && p.status != "failed");
        receipt_matches && authorized_matches
    });
    Json(Collection::new(items))
}

pub async fn list_order_payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Collection<Payment>> {
    let db = state.db.read().await;
    find(&db.orders, &id)?;
    let items = ListQuery::default().page(&db.payments, |p| p.order_id.as_deref() == Some(id.as_str()));
    Ok(Json(Collection::new(items)))
}

// --- payments ---

pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Collection<Payment>> {
    let db = state.db.read().await;
    Json(Collection::new(query.page(&db.payments, |_| true)))
}

pub async fn get_payment(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Payment> {
    let db = state.db.read().await;
    find(&db.payments, &id).cloned().map(Json)
}

pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Payment> {
    let input: NotesInput = parse_body(&body)?;
    let mut db = state.db.write().await;
    let payment = find_mut(&mut db.payments, &id)?;
    if let Some(notes) = input.notes {
        payment.notes = notes;
    }
    Ok(Json(payment.clone()))
}

pub async fn capture_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Payment> {
    let input: CaptureInput = parse_body(&body)?;
    let amount = required(input.amount, "amount")?;
    let mut guard = state.db.write().await;
    let db = &mut *guard;

    let payment = find_mut(&mut db.payments, &id)?;
    match payment.status {
        "authorized" => {}
        "captured" | "refunded" => {
            return Err(ApiError::bad_request("This payment has already been captured"))
        }
        _ => {
            return Err(ApiError::bad_request(
                "Only payments which have been authorized and not yet captured can be captured",
            ))
        }
    }
    if amount != payment.amount {
        return Err(
            ApiError::bad_request("Capture amount must be equal to the amount authorized")
                .with_field("amount"),
        );
    }
    if input.currency.as_ref().is_some_and(|c| *c != payment.currency) {
        return Err(
            ApiError::bad_request("The currency should be same as the payment currency")
                .with_field("currency"),
        );
    }

    let fee = amount * 2 / 100;
    payment.status = "captured";
    payment.captured = true;
    payment.fee = Some(fee);
    payment.tax = Some(fee * 18 / 100);
    let captured = payment.clone();

    if let Some(order_id) = &captured.order_id {
        if let Ok(order) = find_mut(&mut db.orders, order_id) {
            order.amount_paid += amount;
            order.amount_due = (order.amount - order.amount_paid).max(0);
            if order.amount_due == 0 {
                order.status = "paid";
            }
        }
    }
    Ok(Json(captured))
}

pub async fn get_payment_card(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Card> {
    let db = state.db.read().await;
    let payment = find(&db.payments, &id)?;
    payment
        .card
        .clone()
        .map(Json)
        .ok_or_else(|| ApiError::bad_request("Card details are not available for this payment"))
}

pub async fn create_refund(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Refund> {
    let input: RefundInput = parse_body(&body)?;
    let mut guard = state.db.write().await;
    let db = &mut *guard;

    let payment = find_mut(&mut db.payments, &id)?;
    if !payment.captured {
        return Err(ApiError::bad_request("The payment has not been captured"));
    }
    let refundable = payment.refundable();
    if refundable == 0 {
        return Err(ApiError::bad_request("The payment has been fully refunded already"));
    }
    let amount = check_amount(input.amount.unwrap_or(refundable))?;
    if amount > refundable {
        return Err(
            ApiError::bad_request("The refund amount provided is greater than amount captured")
                .with_field("amount"),
        );
    }

    payment.amount_refunded += amount;
    if payment.refundable() == 0 {
        payment.refund_status = Some("full");
        payment.status = "refunded";
    } else {
        payment.refund_status = Some("partial");
    }

    let refund = Refund {
        id: new_id("rfnd"),
        entity: "refund",
        amount,
        currency: payment.currency.clone(),
        payment_id: payment.id.clone(),
        receipt: input.receipt,
        acquirer_data: BTreeMap::from([("arn".to_string(), None)]),
        status: "processed",
        speed_processed: "normal".to_string(),
        speed_requested: input.speed.unwrap_or_else(|| "normal".to_string()),
        notes: input.notes.unwrap_or_default(),
        created_at: now(),
    };
    db.refunds.push(refund.clone());
    Ok(Json(refund))
}

pub async fn list_payment_refunds(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Collection<Refund>> {
    let db = state.db.read().await;
    find(&db.payments, &id)?;
    let items = query.page(&db.refunds, |r| r.payment_id == id);
    Ok(Json(Collection::new(items)))
}

// --- refunds ---

pub async fn list_refunds(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Collection<Refund>> {
    let db = state.db.read().await;
    Json(Collection::new(query.page(&db.refunds, |_| true)))
}

pub async fn get_refund(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Refund> {
    let db = state.db.read().await;
    find(&db.refunds, &id).cloned().map(Json)
}

pub async fn update_refund(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Refund> {
    let input: NotesInput = parse_body(&body)?;
    let mut db = state.db.write().await;
    let refund = find_mut(&mut db.refunds, &id)?;
    if let Some(notes) = input.notes {
        refund.notes = notes;
    }
    Ok(Json(refund.clone()))
}

// --- payment links ---

fn ensure_link_open(link: &PaymentLink, action: &str) -> Result<(), ApiError> {
    match link.status {
        "created" | "partially_paid" => Ok(()),
        status => Err(ApiError::bad_request(format!(
            "Payment link cannot be {action} as it is already {status}"
        ))),
    }
}

pub async fn create_payment_link(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<PaymentLink> {
    let input: PaymentLinkInput = parse_body(&body)?;
    let amount = check_amount(required(input.amount, "amount")?)?;
    let accept_partial = input.accept_partial.unwrap_or(false);
    if !accept_partial && input.first_min_partial_amount.is_some() {
        return Err(ApiError::bad_request(
            "first_min_partial_amount is not allowed when accept_partial is false",
        )
        .with_field("first_min_partial_amount"));
    }

    let id = new_id("plink");
    let created_at = now();
    let link = PaymentLink {
        short_url: format!("https://rzp.io/i/{}", &id[id.len() - 9..]),
        id,
        entity: "payment_link",
        amount,
        amount_paid: 0,
        currency: input.currency.unwrap_or_else(|| "INR".to_string()),
        accept_partial,
        first_min_partial_amount: input.first_min_partial_amount.unwrap_or(0),
        description: input.description.unwrap_or_default(),
        customer: input.customer.unwrap_or_default(),
        callback_url: input.callback_url.unwrap_or_default(),
        callback_method: input.callback_method.unwrap_or_default(),
        cancelled_at: 0,
        expire_by: input.expire_by.unwrap_or(0),
        expired_at: 0,
        notify: input.notify.unwrap_or_default(),
        reference_id: input.reference_id.unwrap_or_default(),
        reminder_enable: input.reminder_enable.unwrap_or(false),
        reminders: None,
        payments: None,
        status: "created",
        notes: input.notes.unwrap_or_default(),
        created_at,
        updated_at: created_at,
    };
    state.db.write().await.payment_links.push(link.clone());
    Ok(Json(link))
}

/// `reference_id`, `expire_by`, `reminder_enable`, `accept_partial` and
/// `notes` can change while the link is open.
pub async fn update_payment_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<PaymentLink> {
    let input: PaymentLinkInput = parse_body(&body)?;
    let mut db = state.db.write().await;
    let link = find_mut(&mut db.payment_links, &id)?;
    ensure_link_open(link, "updated")?;

    if let Some(reference_id) = input.reference_id {
        link.reference_id = reference_id;
    }
    if let Some(expire_by) = input.expire_by {
        link.expire_by = expire_by;
    }
    if let Some(reminder_enable) = input.reminder_enable {
        link.reminder_enable = reminder_enable;
    }
    if let Some(accept_partial) = input.accept_partial {
        link.accept_partial = accept_partial;
    }
    if let Some(notes) = input.notes {
        link.notes = notes;
    }
    link.updated_at = now();
    Ok(Json(link.clone()))
}

pub async fn get_payment_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PaymentLink> {
    let db = state.db.read().await;
    find(&db.payment_links, &id).cloned().map(Json)
}

pub async fn list_payment_links(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<PaymentLinkCollection> {
    let db = state.db.read().await;
    let payment_links = query.page(&db.payment_links, |link| {
        let reference_matches = query
            .reference_id
            .as_ref()
            .is_none_or(|reference_id| link.reference_id == *reference_id);
        let payment_matches = query.payment_id.as_ref().is_none_or(|payment_id| {
            link.payments
                .iter()
                .flatten()
                .any(|p| p["payment_id"] == payment_id.as_str())
        });
        reference_matches && payment_matches
    });
    Json(PaymentLinkCollection { payment_links })
}

pub async fn notify_payment_link(
    State(state): State<AppState>,
    Path((id, medium)): Path<(String, String)>,
) -> ApiResult<Value> {
    if medium != "sms" && medium != "email" {
        return Err(
            ApiError::bad_request("not a valid notification medium").with_field("medium"),
        );
    }
    let db = state.db.read().await;
    let link = find(&db.payment_links, &id)?;
    ensure_link_open(link, "notified")?;
    Ok(Json(json!({ "success": true })))
}

pub async fn cancel_payment_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PaymentLink> {
    let mut db = state.db.write().await;
    let link = find_mut(&mut db.payment_links, &id)?;
    ensure_link_open(link, "cancelled")?;
    let at = now();
    link.status = "cancelled";
    link.cancelled_at = at;
    link.updated_at = at;
    Ok(Json(link.clone()))
}
