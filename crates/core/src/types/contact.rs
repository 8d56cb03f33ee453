//! Contact (phone) number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a contact number is not exactly ten digits.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid contact number (must be 10 digits)")]
pub struct ContactNumberError;

/// A ten digit contact number.
///
/// ```
/// use eshop_core::ContactNumber;
///
/// assert!(ContactNumber::parse("9876543210").is_ok());
/// assert!(ContactNumber::parse("98765").is_err());
/// assert!(ContactNumber::parse("98765-43210").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ContactNumber(String);

impl ContactNumber {
    /// Number of digits required.
    pub const LENGTH: usize = 10;

    /// Parse a contact number.
    ///
    /// # Errors
    ///
    /// Returns `ContactNumberError` unless the input is exactly ten ASCII digits.
    pub fn parse(s: &str) -> Result<Self, ContactNumberError> {
        if s.len() == Self::LENGTH && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ContactNumberError)
        }
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_ten_digits() {
        assert!(ContactNumber::parse("0123456789").is_ok());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert_eq!(ContactNumber::parse(""), Err(ContactNumberError));
        assert_eq!(ContactNumber::parse("123456789"), Err(ContactNumberError));
        assert_eq!(ContactNumber::parse("12345678901"), Err(ContactNumberError));
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert_eq!(ContactNumber::parse("12345abcde"), Err(ContactNumberError));
        assert_eq!(ContactNumber::parse("+911234567"), Err(ContactNumberError));
        // Non-ASCII digits are not accepted
        assert_eq!(ContactNumber::parse("١٢٣٤٥٦٧٨٩٠"), Err(ContactNumberError));
    }
}
