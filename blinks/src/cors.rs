use axum::http::header::{ACCEPT_ENCODING, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::response::Response;
use tower_http::cors::{Any, CorsLayer};

use crate::consts::{ACTION_VERSION, BLOCKCHAIN_ID};

pub const X_ACTION_VERSION: HeaderName = HeaderName::from_static("x-action-version");
pub const X_BLOCKCHAIN_IDS: HeaderName = HeaderName::from_static("x-blockchain-ids");

/// Wallets and blink clients fetch actions cross-origin.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, CONTENT_ENCODING, ACCEPT_ENCODING])
        .expose_headers([X_ACTION_VERSION, X_BLOCKCHAIN_IDS])
}

pub async fn action_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(X_ACTION_VERSION, HeaderValue::from_static(ACTION_VERSION));
    headers.insert(X_BLOCKCHAIN_IDS, HeaderValue::from_static(BLOCKCHAIN_ID));
    response
}
