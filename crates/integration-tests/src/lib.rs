//! Integration tests for the Aurora storefront cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aurora-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_session` - Session lifecycle against the abandonment scheduler,
//!   on a paused Tokio clock
//! - `http_notifier` - The reqwest notifier against a local fake endpoint
//!
//! This crate holds the shared fixtures: a [`RecordingNotifier`] and a
//! [`FakeNotifyServer`] that stands in for `/api/email` and `/api/whatsapp`.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use aurora_core::{CustomerId, Email, PhoneNumber, ProductId};
use aurora_storefront::cart::NewLine;
use aurora_storefront::models::Customer;
use aurora_storefront::notify::{EmailTrigger, Notifier, NotifyError, WhatsAppMessage};
use axum::{Json, Router};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header::AUTHORIZATION};
use axum::routing::post;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

// =============================================================================
// Fixtures
// =============================================================================

/// A signed-in customer with a WhatsApp number.
#[must_use]
pub fn customer_with_phone() -> Customer {
    Customer {
        id: CustomerId::new(42),
        email: Email::parse("ana.lima@aurora.com.br").expect("valid email"),
        name: "Ana Lima".to_string(),
        phone: Some(PhoneNumber::parse("(11) 98765-4321").expect("valid phone")),
    }
}

/// A signed-in customer who never gave a phone number.
#[must_use]
pub fn customer_without_phone() -> Customer {
    Customer {
        id: CustomerId::new(43),
        email: Email::parse("bruno@aurora.com.br").expect("valid email"),
        name: "Bruno Costa".to_string(),
        phone: None,
    }
}

/// One linen dress, R$ 299,90.
#[must_use]
pub fn vestido() -> NewLine {
    NewLine::new(ProductId::new(1), "Vestido Linho", Decimal::new(29990, 2))
}

/// One silk blouse, R$ 150,00.
#[must_use]
pub fn blusa() -> NewLine {
    NewLine::new(ProductId::new(2), "Blusa Seda", Decimal::new(15000, 2))
}

// =============================================================================
// Recording notifier
// =============================================================================

/// Notifier that remembers every call.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    emails: Mutex<Vec<EmailTrigger>>,
    whatsapps: Mutex<Vec<WhatsAppMessage>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn emails(&self) -> Vec<EmailTrigger> {
        self.emails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn whatsapps(&self) -> Vec<WhatsAppMessage> {
        self.whatsapps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total calls across both channels.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.emails().len() + self.whatsapps().len()
    }
}

impl Notifier for RecordingNotifier {
    async fn trigger_email(&self, trigger: &EmailTrigger) -> Result<(), NotifyError> {
        self.emails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(trigger.clone());
        Ok(())
    }

    async fn send_whatsapp(&self, message: &WhatsAppMessage) -> Result<(), NotifyError> {
        self.whatsapps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        Ok(())
    }
}

// =============================================================================
// Fake notification endpoint
// =============================================================================

/// A request the fake endpoint received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct ServerState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    reply: Arc<Mutex<(StatusCode, Value)>>,
}

/// Local HTTP server answering `POST /api/email` and `POST /api/whatsapp`.
///
/// Replies `200 {"success": true}` until told otherwise. Stops when dropped.
pub struct FakeNotifyServer {
    addr: SocketAddr,
    state: ServerState,
    handle: JoinHandle<()>,
}

impl FakeNotifyServer {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = ServerState {
            requests: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(Mutex::new((StatusCode::OK, json!({"success": true})))),
        };

        let app = Router::new()
            .route("/api/email", post(record))
            .route("/api/whatsapp", post(record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake endpoint");
        let addr = listener.local_addr().expect("Listener has an address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake endpoint crashed");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL to configure the notifier with.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Valid base URL")
    }

    /// Change the reply for subsequent requests.
    pub fn respond_with(&self, status: StatusCode, body: Value) {
        *self.state.reply.lock().unwrap_or_else(PoisonError::into_inner) = (status, body);
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for FakeNotifyServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            path: uri.path().to_string(),
            authorization,
            body,
        });

    let (status, reply) = state
        .reply
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    (status, Json(reply))
}
