//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. Security headers
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded on the span)
//! 5. Session layer (tower-sessions, in-memory store)
//! 6. Session guard (token expiry and periodic re-verification)
//! 7. Rate limiting (governor), on the login and signup submissions only
//!
//! Extractors: [`RequireAuth`], [`RequireAdmin`], [`OptionalAuth`] and
//! [`PageContext`].

pub mod auth;
pub mod context;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAdmin, RequireAuth, SESSION_EXPIRED_NOTICE, clear_current_user,
    expire_session, session_guard, set_current_user,
};
pub use context::{HeaderView, PageContext};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
