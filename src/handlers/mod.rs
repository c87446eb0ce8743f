//! HTTP handlers

pub mod health;
pub mod posts;
pub mod users;

pub use health::health;

use axum::http::{header, HeaderMap};

/// Message returned when a write endpoint receives a non-JSON body. Stays on
/// the normal response channel, like every recovered error in this service.
pub(crate) const NOT_JSON_MSG: &str = "Error: Data must be sent as JSON.";

/// True when the request declares a JSON media type, ignoring parameters
/// such as `charset`.
pub(crate) fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case("application/json")
        })
        .unwrap_or(false)
}
