//! The request executor: one authenticated JSON round trip per call.
//!
//! # Design
//! `Client` carries no mutable state between calls, so a shared reference can
//! be used from multiple threads as long as the agent allows it (ureq agents
//! do). Each call is split into `build_request`, which produces the outgoing
//! request as plain data, and `dispatch`, which runs it over the agent and
//! decodes the body. The split keeps the request shape assertable in tests
//! without a live server.
//!
//! The final URL is the plain string concatenation `base_url + path` with no
//! slash normalization; callers are responsible for the joint. An empty base
//! URL means every path must already be an absolute URL.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use ureq::http::header::{AUTHORIZATION, CONTENT_TYPE};
use ureq::http::Request;
use ureq::Agent;
use validator::Validate;

use crate::error::ApiError;

/// Blocking client for the ZeptoMail API.
///
/// Holds a caller-supplied [`Agent`], a base URL, and a credential string
/// sent verbatim as the `Authorization` header value (the credential must
/// already carry its scheme token, e.g. `Zoho-enczapikey ...`). Immutable
/// after construction.
#[derive(Clone)]
pub struct Client {
    agent: Agent,
    base_url: String,
    token: String,
}

// The credential must not leak through debug output.
impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client from an agent, a credential, and an optional base
    /// URL. `None` leaves the base URL empty, in which case `path` arguments
    /// to [`execute`](Self::execute) must be absolute URLs.
    ///
    /// Deadlines and status handling belong to the agent: configure it with
    /// `http_status_as_error(false)` so non-2xx responses are decoded as
    /// data rather than failing the transport stage.
    pub fn new(agent: Agent, token: &str, base_url: Option<&str>) -> Self {
        Self {
            agent,
            base_url: base_url.unwrap_or_default().to_string(),
            token: token.to_string(),
        }
    }

    /// Serialize `body` (if any), dispatch `method` against
    /// `base_url + path`, and decode the response body as JSON into `R`.
    ///
    /// The method string is forwarded as-is; any token the `http` crate
    /// accepts goes out on the wire. The `Content-Type` and `Authorization`
    /// headers are set only when a body is present — a bodiless request is
    /// sent unauthenticated. The HTTP status code is never inspected, so a
    /// 4xx/5xx response with a JSON body decodes like any other; callers
    /// that need to tell an API error from a success must capture the error
    /// fields in `R`.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] variant for the first stage that fails:
    /// serialization, request construction, transport, body read, or decode.
    /// Nothing is retried; on error no response value is produced.
    pub fn execute<B, R>(&self, method: &str, path: &str, body: Option<&B>) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let payload = match body {
            Some(value) => Some(
                serde_json::to_vec(value)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?,
            ),
            None => None,
        };
        let request = self.build_request(method, path, payload)?;
        self.dispatch(request)
    }

    /// Run the payload's validation rules, then [`execute`](Self::execute).
    ///
    /// The validation step is stateless and happens entirely before any
    /// serialization or network activity.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ValidationError`] if `body` fails validation,
    /// otherwise whatever `execute` returns.
    pub fn execute_validated<B, R>(&self, method: &str, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Validate,
        R: DeserializeOwned,
    {
        body.validate()
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;
        self.execute(method, path, Some(body))
    }

    /// Build the outgoing request as plain data. Headers are attached only
    /// when a payload is present.
    fn build_request(
        &self,
        method: &str,
        path: &str,
        payload: Option<Vec<u8>>,
    ) -> Result<Request<Option<Vec<u8>>>, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = Request::builder().method(method).uri(url);
        if payload.is_some() {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .header(AUTHORIZATION, self.token.as_str());
        }
        builder
            .body(payload)
            .map_err(|e| ApiError::RequestConstructionError(e.to_string()))
    }

    /// Run the request over the agent, drain the response body, and decode
    /// it as JSON.
    fn dispatch<R>(&self, request: Request<Option<Vec<u8>>>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let (parts, payload) = request.into_parts();
        debug!(method = %parts.method, uri = %parts.uri, "dispatching request");

        let result = match payload {
            Some(bytes) => self.agent.run(Request::from_parts(parts, bytes.as_slice())),
            None => self.agent.run(Request::from_parts(parts, ())),
        };
        let mut response = result.map_err(|e| ApiError::TransportError(e.to_string()))?;

        let raw = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::BodyReadError(e.to_string()))?;
        debug!(status = %response.status(), bytes = raw.len(), "response received");

        serde_json::from_str(&raw).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}
