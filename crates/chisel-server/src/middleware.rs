//! Response header layers.

use axum::http::HeaderValue;
use axum::http::header::{self, HeaderName};
use tower_http::set_header::SetResponseHeaderLayer;

/// `Cache-Control` value for an optional max age.
pub(crate) fn cache_control_value(max_age: Option<u64>) -> HeaderValue {
    match max_age {
        Some(seconds) => HeaderValue::from_str(&format!("public, max-age={seconds}"))
            .unwrap_or_else(|_| HeaderValue::from_static("no-cache")),
        None => HeaderValue::from_static("no-cache"),
    }
}

/// Create layer that adds `Cache-Control` to responses lacking one.
pub(crate) fn cache_control_layer(max_age: Option<u64>) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(header::CACHE_CONTROL, cache_control_value(max_age))
}

/// Create layer that adds X-Content-Type-Options header.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}
