//! Integration tests for the Mart cart client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mart-integration-tests
//! ```
//!
//! # Harness
//!
//! - [`CartServer`] - an in-process axum server that records every request
//!   and answers with a configurable status
//! - [`RecordingPorts`] - notifier and navigator that remember what the
//!   client asked of them
//! - [`TestContext`] - a [`CartClient`] wired to both
//! - [`LogCapture`] - collects formatted tracing output for the current thread

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use mart_cart_client::{
    CartClient, CartClientConfig, MemorySessionStorage, Navigator, Notifier, StatusPolicy,
};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use url::Url;

/// Token seeded into session storage by [`TestContext::signed_in`].
pub const TEST_TOKEN: &str = "test-access-token";

/// A request as the cart server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Body parsed as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Clone)]
struct ServerState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    status: Arc<Mutex<StatusCode>>,
    cart: Arc<Mutex<serde_json::Value>>,
}

/// In-process cart API that records requests.
pub struct CartServer {
    addr: SocketAddr,
    state: ServerState,
}

impl CartServer {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = ServerState {
            requests: Arc::new(Mutex::new(Vec::new())),
            status: Arc::new(Mutex::new(StatusCode::OK)),
            cart: Arc::new(Mutex::new(serde_json::json!({
                "cartId": 1,
                "productResponses": []
            }))),
        };

        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL clients should use.
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    /// Status returned for every subsequent request.
    pub fn respond_with(&self, status: StatusCode) {
        *self.state.status.lock().unwrap() = status;
    }

    /// Body returned for `GET /carts`.
    pub fn set_cart(&self, cart: serde_json::Value) {
        *self.state.cart.lock().unwrap() = cart;
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: axum::http::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };

    let is_get = method == Method::GET;
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(String::from),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body,
    });

    let status = *state.status.lock().unwrap();
    if is_get && status.is_success() {
        let cart = state.cart.lock().unwrap().clone();
        return (status, axum::Json(cart)).into_response();
    }
    status.into_response()
}

/// Notifier and navigator that record every call.
#[derive(Debug, Default)]
pub struct RecordingPorts {
    messages: Mutex<Vec<String>>,
    redirects: Mutex<Vec<String>>,
    refreshes: Mutex<usize>,
}

impl RecordingPorts {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> usize {
        *self.refreshes.lock().unwrap()
    }

    /// True if no notification, redirect or refresh happened.
    pub fn untouched(&self) -> bool {
        self.messages().is_empty() && self.redirects().is_empty() && self.refreshes() == 0
    }
}

impl Notifier for RecordingPorts {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

impl Navigator for RecordingPorts {
    fn redirect(&self, path: &str) {
        self.redirects.lock().unwrap().push(path.to_string());
    }

    fn refresh(&self) {
        *self.refreshes.lock().unwrap() += 1;
    }
}

/// A cart client pointed at a [`CartServer`].
pub struct TestContext {
    pub server: CartServer,
    pub client: CartClient,
    pub ports: Arc<RecordingPorts>,
    pub session: Arc<MemorySessionStorage>,
}

impl TestContext {
    /// Client with [`TEST_TOKEN`] in session storage.
    pub async fn signed_in() -> Self {
        Self::with_policy(StatusPolicy::Settle, Some(TEST_TOKEN)).await
    }

    /// Client with empty session storage.
    pub async fn signed_out() -> Self {
        Self::with_policy(StatusPolicy::Settle, None).await
    }

    /// Client with the given status policy and optional token.
    pub async fn with_policy(policy: StatusPolicy, token: Option<&str>) -> Self {
        let server = CartServer::start().await;
        let config = CartClientConfig::new(server.base_url()).with_status_policy(policy);
        let (client, ports, session) = build_client(&config, token);

        Self {
            server,
            client,
            ports,
            session,
        }
    }
}

/// Build a client with recording ports against any configuration.
pub fn build_client(
    config: &CartClientConfig,
    token: Option<&str>,
) -> (CartClient, Arc<RecordingPorts>, Arc<MemorySessionStorage>) {
    let session = Arc::new(token.map_or_else(
        MemorySessionStorage::new,
        MemorySessionStorage::with_access_token,
    ));
    let ports = Arc::new(RecordingPorts::default());
    let client = CartClient::new(
        config,
        Arc::clone(&session),
        Arc::clone(&ports),
        Arc::clone(&ports),
    )
    .unwrap();

    (client, ports, session)
}

/// A base URL on which nothing is listening.
pub async fn unreachable_base_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// Formatted tracing output captured from the current thread.
///
/// The subscriber is installed with `set_default`, so only events emitted on
/// this thread are seen. Use it from a current-thread `#[tokio::test]`.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Capture `WARN` and above until the returned guard is dropped.
    pub fn start() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    /// Captured lines at the given level (`"ERROR"`, `"WARN"`).
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let output = String::from_utf8(self.buffer.lock().unwrap().clone()).unwrap();
        output
            .lines()
            .filter(|line| line.split_whitespace().any(|word| word == level))
            .map(String::from)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
