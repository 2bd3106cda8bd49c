//! Security headers middleware.

use axum::{
    body::Body,
    http::{header::HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Adds `nosniff`, frame denial, a referrer policy and `no-store` caching
/// (unless the handler set its own `Cache-Control`) to every response.
///
/// HSTS belongs to the TLS-terminating proxy.
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if !headers.contains_key("Cache-Control") {
        headers.insert(
            "Cache-Control",
            HeaderValue::from_static("no-store, max-age=0"),
        );
    }

    response
}
