//! Rate limiting for the credential endpoints using governor and `tower_governor`.
//!
//! Only `POST /login` and `POST /signup` are limited: they forward credentials
//! to the REST API and are the brute-force target.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::AuthConfig;

/// Proxy headers carrying the client address, most trusted first.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that reads the client IP from proxy headers, then falls back
/// to the socket peer address.
///
/// The peer fallback needs the server to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        for name in CLIENT_IP_HEADERS {
            // X-Forwarded-For lists the client first
            if let Some(ip) = headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
            {
                return Ok(ip);
            }
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for login and signup submissions.
///
/// One request is replenished every `rate_per_second` seconds, with bursts of
/// `rate_burst`. The defaults (6 and 5) allow about ten attempts a minute per
/// client.
///
/// # Panics
///
/// Does not panic in practice: `AuthConfig` clamps both values to at least 1,
/// which `GovernorConfigBuilder` always accepts.
#[must_use]
pub fn auth_rate_limiter(config: &AuthConfig) -> RateLimiterLayer {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(config.rate_per_second.max(1))
        .burst_size(config.rate_burst.max(1))
        .finish()
        .expect("rate limiter config with non-zero period and burst is valid");
    GovernorLayer::new(Arc::new(governor))
}
