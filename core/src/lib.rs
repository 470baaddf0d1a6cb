//! Minimal client core for the ZeptoMail transactional email API.
//!
//! # Overview
//! Builds authenticated JSON requests, dispatches them over a caller-supplied
//! [`ureq::Agent`], and decodes JSON responses. One blocking round trip per
//! call. No retries, no caching, no protocol state between calls.
//!
//! # Design
//! - `Client` is immutable after construction and holds only the agent, a
//!   base URL, and a credential string.
//! - `execute` is generic over any `Serialize` payload in and any
//!   `DeserializeOwned` shape out; endpoint-specific builders live with the
//!   caller, not here.
//! - The HTTP status code is never inspected: response bodies are decoded as
//!   data regardless of status, so the agent should be configured with
//!   `http_status_as_error(false)`.
//! - Request construction is split from dispatch so the outgoing request can
//!   be asserted on without touching the network.

pub mod client;
pub mod error;

pub use client::Client;
pub use error::ApiError;
