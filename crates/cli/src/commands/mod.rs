//! CLI command implementations.

pub mod api;
pub mod token;
