//! Core types for the storefront.
//!
//! Records mirrored from the REST API plus validated newtypes for form input.

pub mod address;
pub mod contact;
pub mod email;
pub mod id;
pub mod order;
pub mod password;
pub mod price;
pub mod product;
pub mod role;
pub mod user;

pub use address::{Address, AddressError, AddressInput};
pub use contact::{ContactNumber, ContactNumberError};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::OrderItem;
pub use password::{PasswordError, confirm_password, require_password, validate_password};
pub use price::{CurrencyCode, Price};
pub use product::{Product, ProductInput, truncate_chars};
pub use role::Role;
pub use user::User;
