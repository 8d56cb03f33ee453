//! Response hardening headers.
//!
//! Every page is a plain HTML form rendered on the server, so the policy can
//! stay tight: no scripts, no framing, no third-party connections. Product
//! images are the one exception; the catalog stores arbitrary HTTPS image
//! URLs, so `img-src` and the embedder policy are relaxed for them.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Content Security Policy for storefront pages.
const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; \
     style-src 'self'; \
     img-src 'self' https: data:; \
     font-src 'self'; \
     form-action 'self'; \
     base-uri 'self'; \
     object-src 'none'; \
     frame-ancestors 'none'";

/// Browser features the storefront never uses.
const PERMISSIONS_POLICY: &str = "camera=(), microphone=(), geolocation=(), payment=(), \
     usb=(), serial=(), hid=(), fullscreen=(), autoplay=(), \
     browsing-topics=(), interest-cohort=()";

/// Header name/value pairs applied to every response.
const SECURITY_HEADERS: [(&str, &str); 10] = [
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    ("permissions-policy", PERMISSIONS_POLICY),
    // Pages carry the signed-in user's name and addresses
    ("cache-control", "no-store, max-age=0"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    // Catalog images are cross-origin and rarely send CORP headers
    ("cross-origin-embedder-policy", "credentialless"),
    ("x-dns-prefetch-control", "off"),
];

/// Add the security headers to every response.
///
/// Headers already set by a handler are overwritten.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}
