//! In-process stub of the ZeptoMail API for client tests.
//!
//! Models just enough of the real surface: an authenticated send endpoint, a
//! bodiless listing endpoint, a route that answers with a non-JSON body, and
//! a JSON 404 fallback. Every handler records the request it received
//! (method, path, headers, body) into a shared [`RequestLog`] before
//! responding, so tests can assert on the exact wire traffic.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

/// One request as observed by the server.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Lowercased header names with their values, in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Value of the first header named `name` (lowercase), if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Shared log of every request the server has seen.
pub type RequestLog = Arc<RwLock<Vec<RecordedRequest>>>;

/// Build the router together with the log it records into.
pub fn app() -> (Router, RequestLog) {
    let log: RequestLog = Arc::new(RwLock::new(Vec::new()));
    let router = Router::new()
        .route("/v1.1/email", post(send_email))
        .route("/v1.1/email/templates", get(list_templates))
        .route("/broken", get(broken))
        .fallback(unknown_route)
        .with_state(log.clone());
    (router, log)
}

/// Serve the stub on `listener` until the process exits.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let (router, _) = app();
    axum::serve(listener, router).await
}

async fn record(log: &RequestLog, method: Method, uri: Uri, headers: &HeaderMap, body: String) {
    let recorded = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect(),
        body,
    };
    log.write().await.push(recorded);
}

async fn send_email(
    State(log): State<RequestLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|v| !v.is_empty());
    record(&log, method, uri, &headers, body).await;

    if authorized {
        (
            StatusCode::CREATED,
            Json(json!({
                "data": [{"code": "EM_104", "message": "Email request received"}],
                "message": "OK",
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": "TM_4001", "message": "unauthorized"}})),
        )
    }
}

async fn list_templates(
    State(log): State<RequestLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Json<serde_json::Value> {
    record(&log, method, uri, &headers, body).await;
    Json(json!({"data": [], "message": "OK"}))
}

async fn broken(
    State(log): State<RequestLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    record(&log, method, uri, &headers, body).await;
    "this is not json"
}

async fn unknown_route(
    State(log): State<RequestLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    record(&log, method, uri, &headers, body).await;
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": {"code": "TM_3301", "message": "invalid api request url"}})),
    )
}
