//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during authentication operations.
///
/// `Display` for the login and signup variants is the notice shown to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials rejected, or the sign in call failed.
    #[error("Invalid credentials!")]
    InvalidCredentials(#[source] ApiError),

    /// The API accepted the credentials without issuing a token.
    #[error("Authentication failed! No token received.")]
    NoToken,

    /// The API refused the new account.
    #[error("Signup failed!")]
    SignupFailed(#[source] ApiError),

    /// The stored token could not be decoded.
    #[error("malformed session token")]
    MalformedToken,

    /// The API no longer accepts the stored token (or could not be reached).
    #[error("session verification failed: {0}")]
    VerificationFailed(#[source] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            AuthError::InvalidCredentials(ApiError::Unauthorized).to_string(),
            "Invalid credentials!"
        );
        assert_eq!(
            AuthError::NoToken.to_string(),
            "Authentication failed! No token received."
        );
        assert_eq!(
            AuthError::SignupFailed(ApiError::Forbidden).to_string(),
            "Signup failed!"
        );
    }
}
