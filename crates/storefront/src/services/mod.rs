//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Login/signup validation and token lifecycle
//! - `catalog` - Category bar, search and sort over the product list
//! - `checkout` - Order wizard state machine

pub mod auth;
pub mod catalog;
pub mod checkout;
