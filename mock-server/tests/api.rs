use axum::http::{self, Request, StatusCode};
use axum::Router;
use base64::Engine;
use http_body_util::BodyExt;
use mock_server::{app, AUTHORIZED_PAYMENT_ID, CAPTURED_PAYMENT_ID, MOCK_KEY_ID, MOCK_KEY_SECRET, SEEDED_ORDER_ID};
use serde_json::{json, Value};
use tower::ServiceExt;

fn basic_auth(key_id: &str, key_secret: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{key_id}:{key_secret}"));
    format!("Basic {encoded}")
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, basic_auth(MOCK_KEY_ID, MOCK_KEY_SECRET))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.map(|b| b.to_string()).unwrap_or_default())
        .unwrap()
}

async fn send(app: &Router, req: Request<String>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_return_401_envelope() {
    let app = app();
    let req = Request::builder().uri("/v1/orders").body(String::new()).unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "BAD_REQUEST_ERROR");
    assert_eq!(body["error"]["description"], "The api key provided is invalid");
}

#[tokio::test]
async fn wrong_secret_returns_401() {
    let app = app();
    let req = Request::builder()
        .uri("/v1/orders")
        .header(http::header::AUTHORIZATION, basic_auth(MOCK_KEY_ID, "nope"))
        .body(String::new())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn custom_credentials_are_honoured() {
    let app = mock_server::app_with_credentials("rzp_test_other", "other_secret");
    let req = Request::builder()
        .uri("/v1/payments")
        .header(http::header::AUTHORIZATION, basic_auth("rzp_test_other", "other_secret"))
        .body(String::new())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
}

// --- customers ---

#[tokio::test]
async fn create_customer_then_duplicate() {
    let app = app();
    let input = json!({"name": "Gaurav Kumar", "email": "gaurav.kumar@example.com", "contact": "9123456780"});
    let (status, created) = send(&app, request("POST", "/v1/customers", Some(input.clone()))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(created["id"].as_str().unwrap().starts_with("cust_"));
    assert_eq!(created["notes"], json!([]));

    let (status, body) = send(&app, request("POST", "/v1/customers", Some(input.clone()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["description"], "Customer already exists for the merchant");

    let mut lenient = input;
    lenient["fail_existing"] = json!("0");
    let (status, existing) = send(&app, request("POST", "/v1/customers", Some(lenient))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(existing["id"], created["id"]);
}

#[tokio::test]
async fn customer_without_name_is_rejected_with_field() {
    let app = app();
    let (status, body) = send(&app, request("POST", "/v1/customers", Some(json!({})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "name");
}

#[tokio::test]
async fn update_customer_replaces_given_fields() {
    let app = app();
    let (_, created) = send(
        &app,
        request("POST", "/v1/customers", Some(json!({"name": "A", "email": "a@example.com"}))),
    )
    .await;
    let uri = format!("/v1/customers/{}", created["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        request("PUT", &uri, Some(json!({"name": "B", "notes": {"tier": "gold"}}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "B");
    assert_eq!(updated["email"], "a@example.com");
    assert_eq!(updated["notes"], json!({"tier": "gold"}));
}

// --- orders ---

#[tokio::test]
async fn create_order_and_fetch_it() {
    let app = app();
    let (status, order) = send(
        &app,
        request("POST", "/v1/orders", Some(json!({"amount": 50000, "currency": "INR", "receipt": "r1"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "created");
    assert_eq!(order["amount_due"], 50000);

    let uri = format!("/v1/orders/{}", order["id"].as_str().unwrap());
    let (status, fetched) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, order);
}

#[tokio::test]
async fn order_below_minimum_amount_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        request("POST", "/v1/orders", Some(json!({"amount": 50, "currency": "INR"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["description"], "The amount must be atleast INR 1.00");
    assert_eq!(body["error"]["field"], "amount");
}

#[tokio::test]
async fn malformed_body_gets_error_envelope() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/v1/orders")
        .header(http::header::AUTHORIZATION, basic_auth(MOCK_KEY_ID, MOCK_KEY_SECRET))
        .body("{not json".to_string())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST_ERROR");
}

#[tokio::test]
async fn list_orders_filters_and_ignores_expand() {
    let app = app();
    send(&app, request("POST", "/v1/orders", Some(json!({"amount": 100, "currency": "INR"})))).await;

    let (status, all) = send(&app, request("GET", "/v1/orders?expand%5B%5D=payments", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["entity"], "collection");
    assert_eq!(all["count"], 2);

    let (_, authorized) = send(&app, request("GET", "/v1/orders?authorized=1", None)).await;
    assert_eq!(authorized["count"], 1);
    assert_eq!(authorized["items"][0]["id"], SEEDED_ORDER_ID);

    let (_, page) = send(&app, request("GET", "/v1/orders?count=1&skip=1", None)).await;
    assert_eq!(page["items"][0]["id"], SEEDED_ORDER_ID);
}

#[tokio::test]
async fn unknown_order_is_400_not_404() {
    let app = app();
    let (status, body) = send(&app, request("GET", "/v1/orders/order_missing", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["description"], "The id provided does not exist");
}

// --- payments ---

#[tokio::test]
async fn capturing_a_captured_payment_fails() {
    let app = app();
    let uri = format!("/v1/payments/{CAPTURED_PAYMENT_ID}/capture");
    let (status, body) = send(
        &app,
        request("POST", &uri, Some(json!({"amount": 20000, "currency": "INR"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST_ERROR");
    assert_eq!(body["error"]["description"], "This payment has already been captured");
}

#[tokio::test]
async fn capture_marks_payment_and_order_paid() {
    let app = app();
    let uri = format!("/v1/payments/{AUTHORIZED_PAYMENT_ID}/capture");
    let (status, payment) = send(
        &app,
        request("POST", &uri, Some(json!({"amount": 50000, "currency": "INR"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["status"], "captured");
    assert_eq!(payment["captured"], true);

    let (_, order) = send(&app, request("GET", &format!("/v1/orders/{SEEDED_ORDER_ID}"), None)).await;
    assert_eq!(order["status"], "paid");
    assert_eq!(order["amount_due"], 0);
}

#[tokio::test]
async fn capture_amount_must_match() {
    let app = app();
    let uri = format!("/v1/payments/{AUTHORIZED_PAYMENT_ID}/capture");
    let (status, body) = send(&app, request("POST", &uri, Some(json!({"amount": 100})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "amount");
}

#[tokio::test]
async fn card_route_serves_card_details() {
    let app = app();
    let (status, card) = send(
        &app,
        request("GET", &format!("/v1/payments/{AUTHORIZED_PAYMENT_ID}/card"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["type"], "credit");
    assert_eq!(card["last4"], "1111");

    let (status, _) = send(
        &app,
        request("GET", &format!("/v1/payments/{CAPTURED_PAYMENT_ID}/card"), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn partial_then_full_refund() {
    let app = app();
    let uri = format!("/v1/payments/{CAPTURED_PAYMENT_ID}/refund");
    let (status, refund) = send(&app, request("POST", &uri, Some(json!({"amount": 5000})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refund["payment_id"], CAPTURED_PAYMENT_ID);
    assert_eq!(refund["acquirer_data"], json!({"arn": null}));

    let (_, payment) = send(&app, request("GET", &format!("/v1/payments/{CAPTURED_PAYMENT_ID}"), None)).await;
    assert_eq!(payment["refund_status"], "partial");
    assert_eq!(payment["amount_refunded"], 5000);

    let (status, _) = send(&app, request("POST", &uri, Some(json!({"amount": 50000})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, rest) = send(&app, request("POST", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rest["amount"], 15000);

    let (_, refunds) = send(
        &app,
        request("GET", &format!("/v1/payments/{CAPTURED_PAYMENT_ID}/refunds"), None),
    )
    .await;
    assert_eq!(refunds["count"], 2);
}

#[tokio::test]
async fn uncaptured_payment_cannot_be_refunded() {
    let app = app();
    let uri = format!("/v1/payments/{AUTHORIZED_PAYMENT_ID}/refund");
    let (status, body) = send(&app, request("POST", &uri, Some(json!({})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["description"], "The payment has not been captured");
}

// --- payment links ---

#[tokio::test]
async fn payment_link_lifecycle() {
    let app = app();
    let (status, link) = send(
        &app,
        request(
            "POST",
            "/v1/payment_links",
            Some(json!({"amount": 1000, "description": "Policy", "reference_id": "TS1989"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link["reminders"], json!([]));
    assert_eq!(link["notes"], json!([]));
    assert_eq!(link["currency"], "INR");
    let id = link["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, request("GET", "/v1/payment_links?reference_id=TS1989", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["payment_links"].as_array().unwrap().len(), 1);
    assert!(listed.get("items").is_none());

    let (status, ok) = send(&app, request("POST", &format!("/v1/payment_links/{id}/notify_by/sms"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ok, json!({"success": true}));

    let (status, body) = send(&app, request("POST", &format!("/v1/payment_links/{id}/notify_by/fax"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "medium");

    let (status, cancelled) = send(&app, request("POST", &format!("/v1/payment_links/{id}/cancel"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert!(cancelled["cancelled_at"].as_i64().unwrap() > 0);

    let (status, body) = send(&app, request("POST", &format!("/v1/payment_links/{id}/cancel"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["description"],
        "Payment link cannot be cancelled as it is already cancelled"
    );

    let (status, _) = send(
        &app,
        request("PATCH", &format!("/v1/payment_links/{id}"), Some(json!({"reference_id": "X"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
