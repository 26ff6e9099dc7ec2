//! A self-hosted registry double: token endpoint, search, detail and image routes.
//!
//! Behaviour is scripted per test and every request is counted, so tests can assert
//! how many token exchanges and registry calls a scenario produced.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use markwatch::registry::RegistryConfig;

/// What the search route saw.
#[derive(Debug, Clone)]
pub struct SeenSearch {
    pub query: String,
    pub size: String,
    pub authorization: Option<String>,
    pub client_id: Option<String>,
    pub accept: Option<String>,
}

#[derive(Default)]
struct FakeState {
    token_requests: AtomicUsize,
    search_requests: AtomicUsize,
    detail_requests: AtomicUsize,
    image_requests: AtomicUsize,
    token_failure: Mutex<Option<(u16, String)>>,
    token_expires_in: Mutex<Option<Value>>,
    last_token_form: Mutex<HashMap<String, String>>,
    searches: Mutex<Vec<SeenSearch>>,
    unauthorized_remaining: AtomicUsize,
    search_failure: Mutex<Option<(u16, String)>>,
    search_responses: Mutex<Vec<(String, Value)>>,
    search_delays: Mutex<Vec<(String, Duration)>>,
    detail_delay: Mutex<Option<Duration>>,
    details: Mutex<HashMap<String, Value>>,
    images: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

pub struct FakeRegistry {
    pub addr: SocketAddr,
    state: Arc<FakeState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _handle: JoinHandle<()>,
}

impl FakeRegistry {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/oidc/accessToken", post(token_handler))
            .route("/trademarks", get(search_handler))
            .route("/trademarks/{id}", get(detail_handler))
            .route("/trademarks/{id}/image/thumbnail", get(thumbnail_handler))
            .route("/trademarks/{id}/image", get(full_image_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake registry");
        let addr = listener.local_addr().expect("fake registry addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("fake registry server");
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            _handle: handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> RegistryConfig {
        RegistryConfig::for_base_url(&self.url())
    }

    /// Answers searches whose `query` contains `pattern`. First match wins.
    pub fn on_search(&self, pattern: &str, body: Value) {
        self.state
            .search_responses
            .lock()
            .push((pattern.to_string(), body));
    }

    pub fn on_detail(&self, id: &str, body: Value) {
        self.state.details.lock().insert(id.to_string(), body);
    }

    pub fn on_thumbnail(&self, id: &str, bytes: Vec<u8>, content_type: &str) {
        self.state
            .images
            .lock()
            .insert(format!("{id}/thumbnail"), (bytes, content_type.to_string()));
    }

    /// Holds searches whose `query` contains `pattern` for `delay` before answering.
    pub fn delay_searches(&self, pattern: &str, delay: Duration) {
        self.state
            .search_delays
            .lock()
            .push((pattern.to_string(), delay));
    }

    /// Holds every detail request for `delay` before answering.
    pub fn delay_details(&self, delay: Duration) {
        *self.state.detail_delay.lock() = Some(delay);
    }

    /// Overrides the `expires_in` value sent by the token endpoint.
    pub fn token_expires_in(&self, value: Value) {
        *self.state.token_expires_in.lock() = Some(value);
    }

    /// The next `n` authorized calls answer 401.
    pub fn reject_next(&self, n: usize) {
        self.state.unauthorized_remaining.store(n, Ordering::SeqCst);
    }

    pub fn fail_searches(&self, status: u16, body: &str) {
        *self.state.search_failure.lock() = Some((status, body.to_string()));
    }

    pub fn fail_token(&self, status: u16, body: &str) {
        *self.state.token_failure.lock() = Some((status, body.to_string()));
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn search_requests(&self) -> usize {
        self.state.search_requests.load(Ordering::SeqCst)
    }

    pub fn detail_requests(&self) -> usize {
        self.state.detail_requests.load(Ordering::SeqCst)
    }

    pub fn image_requests(&self) -> usize {
        self.state.image_requests.load(Ordering::SeqCst)
    }

    pub fn last_token_form(&self) -> HashMap<String, String> {
        self.state.last_token_form.lock().clone()
    }

    pub fn searches(&self) -> Vec<SeenSearch> {
        self.state.searches.lock().clone()
    }
}

impl Drop for FakeRegistry {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Consumes one scripted 401, if any.
fn take_unauthorized(state: &FakeState) -> bool {
    state
        .unauthorized_remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

async fn token_handler(
    State(state): State<Arc<FakeState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    *state.last_token_form.lock() = form;

    if let Some((status, body)) = state.token_failure.lock().clone() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
        return (status, body).into_response();
    }

    let expires_in = state
        .token_expires_in
        .lock()
        .clone()
        .unwrap_or_else(|| json!(3600));

    Json(json!({
        "access_token": format!("token-{n}"),
        "token_type": "Bearer",
        "expires_in": expires_in,
    }))
    .into_response()
}

async fn search_handler(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.search_requests.fetch_add(1, Ordering::SeqCst);
    let query = params.get("query").cloned().unwrap_or_default();
    state.searches.lock().push(SeenSearch {
        query: query.clone(),
        size: params.get("size").cloned().unwrap_or_default(),
        authorization: header_value(&headers, "authorization"),
        client_id: header_value(&headers, "x-ibm-client-id"),
        accept: header_value(&headers, "accept"),
    });

    let delay = state
        .search_delays
        .lock()
        .iter()
        .find(|(pattern, _)| query.contains(pattern.as_str()))
        .map(|(_, delay)| *delay);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if take_unauthorized(&state) {
        return (StatusCode::UNAUTHORIZED, "token expired").into_response();
    }

    if let Some((status, body)) = state.search_failure.lock().clone() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, body).into_response();
    }

    let body = state
        .search_responses
        .lock()
        .iter()
        .find(|(pattern, _)| query.contains(pattern.as_str()))
        .map(|(_, body)| body.clone())
        .unwrap_or_else(|| json!({ "trademarks": [] }));

    Json(body).into_response()
}

async fn detail_handler(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> Response {
    state.detail_requests.fetch_add(1, Ordering::SeqCst);
    let delay = *state.detail_delay.lock();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if take_unauthorized(&state) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.details.lock().get(&id) {
        Some(body) => Json(body.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "no such mark").into_response(),
    }
}

async fn thumbnail_handler(state: State<Arc<FakeState>>, Path(id): Path<String>) -> Response {
    image_response(&state, format!("{id}/thumbnail"))
}

async fn full_image_handler(state: State<Arc<FakeState>>, Path(id): Path<String>) -> Response {
    image_response(&state, format!("{id}/full"))
}

fn image_response(state: &FakeState, key: String) -> Response {
    state.image_requests.fetch_add(1, Ordering::SeqCst);
    if take_unauthorized(state) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.images.lock().get(&key) {
        Some((bytes, content_type)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type.as_str())
            .body(Body::from(bytes.clone()))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        None => (StatusCode::NOT_FOUND, "no image").into_response(),
    }
}
