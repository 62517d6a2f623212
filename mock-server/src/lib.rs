//! In-memory fake of the Razorpay REST API for integration tests.
//!
//! # Design
//! - Every route lives under `/v1` behind HTTP Basic authentication against a
//!   single configurable key pair.
//! - State is one `Store` behind a `tokio::sync::RwLock`; lists are returned
//!   newest first, like the real API.
//! - Failures use the `{"error":{...}}` envelope with the upstream codes, and
//!   empty `notes` / `reminders` are sent as `[]`, so clients meet the same
//!   quirks they meet in production.
//! - Payments cannot be created over the API (that happens in checkout), so
//!   the store starts with one authorized and one captured payment.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use tokio::{net::TcpListener, sync::RwLock};

pub mod model;
mod routes;

pub use model::Store;

/// Key pair accepted by `app()`.
pub const MOCK_KEY_ID: &str = "rzp_test_mock";
pub const MOCK_KEY_SECRET: &str = "mock_secret";

pub const SEEDED_ORDER_ID: &str = "order_Seeded00000001";
/// Authorized against `SEEDED_ORDER_ID`, ready to be captured.
pub const AUTHORIZED_PAYMENT_ID: &str = "pay_Authorized0001";
/// Already captured UPI payment without an order.
pub const CAPTURED_PAYMENT_ID: &str = "pay_Captured000001";

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    key_id: Arc<str>,
    key_secret: Arc<str>,
    db: Db,
}

/// Error answered in the upstream `{"error":{...}}` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub description: String,
    pub field: Option<&'static str>,
}

impl ApiError {
    pub fn bad_request(description: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST_ERROR",
            description: description.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            ..Self::bad_request("The api key provided is invalid")
        }
    }

    /// The upstream answers unknown ids with 400, not 404.
    pub fn unknown_id() -> Self {
        Self::bad_request("The id provided does not exist")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = serde_json::json!({
            "code": self.code,
            "description": self.description,
            "source": "business",
            "step": "payment_initiation",
            "reason": "input_validation_failed",
            "metadata": {},
        });
        if let Some(field) = self.field {
            error["field"] = field.into();
        }
        (self.status, Json(serde_json::json!({ "error": error }))).into_response()
    }
}

/// Router accepting `MOCK_KEY_ID` / `MOCK_KEY_SECRET`.
pub fn app() -> Router {
    app_with_credentials(MOCK_KEY_ID, MOCK_KEY_SECRET)
}

pub fn app_with_credentials(key_id: &str, key_secret: &str) -> Router {
    let state = AppState {
        key_id: key_id.into(),
        key_secret: key_secret.into(),
        db: Arc::new(RwLock::new(Store::seeded())),
    };

    let api = Router::new()
        .route("/customers", get(routes::list_customers).post(routes::create_customer))
        .route(
            "/customers/{id}",
            get(routes::get_customer).put(routes::update_customer),
        )
        .route("/orders", get(routes::list_orders).post(routes::create_order))
        .route("/orders/{id}", get(routes::get_order).patch(routes::update_order))
        .route("/orders/{id}/payments", get(routes::list_order_payments))
        .route("/payments", get(routes::list_payments))
        .route(
            "/payments/{id}",
            get(routes::get_payment).patch(routes::update_payment),
        )
        .route("/payments/{id}/capture", post(routes::capture_payment))
        .route("/payments/{id}/card", get(routes::get_payment_card))
        .route("/payments/{id}/refund", post(routes::create_refund))
        .route("/payments/{id}/refunds", get(routes::list_payment_refunds))
        .route("/refunds", get(routes::list_refunds))
        .route("/refunds/{id}", get(routes::get_refund).patch(routes::update_refund))
        .route(
            "/payment_links",
            get(routes::list_payment_links).post(routes::create_payment_link),
        )
        .route(
            "/payment_links/{id}",
            get(routes::get_payment_link).patch(routes::update_payment_link),
        )
        .route(
            "/payment_links/{id}/notify_by/{medium}",
            post(routes::notify_payment_link),
        )
        .route("/payment_links/{id}/cancel", post(routes::cancel_payment_link))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_basic_auth))
        .with_state(state);

    Router::new().nest("/v1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| base64::engine::general_purpose::STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok());

    let expected = format!("{}:{}", state.key_id, state.key_secret);
    match credentials {
        Some(credentials) if credentials == expected => Ok(next.run(request).await),
        _ => Err(ApiError::unauthorized()),
    }
}
