//! CORS layer for the browser client.

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

const METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

/// Build the CORS layer for `origins`.
///
/// Explicit origins get credentialed CORS so the session cookie travels with
/// requests. Without a usable origin the layer allows any origin and no
/// credentials.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        return CorsLayer::new()
            .allow_methods(METHODS)
            .allow_headers(Any)
            .allow_origin(Any);
    }

    CorsLayer::new()
        .allow_methods(METHODS)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        .expose_headers([CONTENT_DISPOSITION])
        .allow_credentials(true)
        .allow_origin(parsed)
}
