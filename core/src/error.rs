//! Error types for the ZeptoMail client core.
//!
//! # Design
//! One variant per failing stage of the round trip, in the order the stages
//! run. Every `Display` rendering starts with a static prefix naming the
//! stage, so the failure class is readable from a log line alone. All
//! variants are terminal for the current call — nothing is retried.

use std::fmt;

/// Errors returned by [`Client::execute`](crate::Client::execute) and
/// [`Client::execute_validated`](crate::Client::execute_validated).
#[derive(Debug)]
pub enum ApiError {
    /// The request payload failed its declared validation rules. Raised
    /// before any serialization or network activity.
    ValidationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),

    /// The method or URL could not form a syntactically valid request.
    RequestConstructionError(String),

    /// The transport failed to complete the round trip (connection refused,
    /// timeout, DNS failure). No claim is made about whether the remote
    /// side received the request.
    TransportError(String),

    /// The response stream could not be fully consumed.
    BodyReadError(String),

    /// The response body was not valid JSON, or did not match the shape of
    /// the requested target type.
    DeserializationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => {
                write!(f, "validation failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "marshal failed: {msg}")
            }
            ApiError::RequestConstructionError(msg) => {
                write!(f, "request construction failed: {msg}")
            }
            ApiError::TransportError(msg) => {
                write!(f, "transport failed: {msg}")
            }
            ApiError::BodyReadError(msg) => {
                write!(f, "body read failed: {msg}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "decode failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
