//! E-Shop Core - Shared types library.
//!
//! This crate provides the types used across the E-Shop components:
//! - `storefront` - Server-rendered shop front backed by the REST API
//! - `cli` - Operator tools (API probe, catalog listing, token inspection)
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O and no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Entity records, type-safe IDs, prices, emails and form rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
