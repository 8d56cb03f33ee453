//! Session-held models for storefront.
//!
//! Entity records live in `eshop_core`; this module holds what the
//! storefront keeps per browser session.

pub mod flash;
pub mod session;

pub use flash::{Flash, Severity, push_flash, take_flash};
pub use session::{CurrentUser, keys as session_keys};
