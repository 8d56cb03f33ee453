//! Session-related types.
//!
//! Types stored in the session for authentication state.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use eshop_core::User;

/// Session-stored identity of the signed-in user.
///
/// Holds the API token next to the account so authenticated calls can be made
/// on the user's behalf. `Debug` redacts the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account as returned by sign in.
    pub user: User,
    /// Token for the `x-auth-token` header.
    access_token: String,
}

impl CurrentUser {
    /// Create a session identity.
    #[must_use]
    pub fn new(user: User, access_token: &SecretString) -> Self {
        use secrecy::ExposeSecret;

        Self {
            user,
            access_token: access_token.expose_secret().to_owned(),
        }
    }

    /// Token for authenticated API calls.
    #[must_use]
    pub fn access_token(&self) -> SecretString {
        SecretString::from(self.access_token.clone())
    }

    /// Raw token, for local claim inspection only.
    #[must_use]
    pub fn raw_token(&self) -> &str {
        &self.access_token
    }

    /// Whether the account may use the product editor.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Account email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.user.email
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("user", &self.user)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the time the stored token was last confirmed by the API.
    pub const AUTH_VERIFIED_AT: &str = "auth_verified_at";

    /// Key for the in-progress order wizard.
    pub const ORDER_DRAFT: &str = "order_draft";

    /// Key for the one-shot notice shown on the next page.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use eshop_core::Role;

    use super::*;

    fn current() -> CurrentUser {
        CurrentUser::new(
            User {
                id: None,
                name: None,
                email: "admin@example.com".to_string(),
                roles: vec![Role::Admin],
            },
            &SecretString::from("tok.en.value"),
        )
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug_output = format!("{:?}", current());
        assert!(debug_output.contains("admin@example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tok.en.value"));
    }

    #[test]
    fn test_session_roundtrip_keeps_token() {
        let json = serde_json::to_value(current()).unwrap();
        let restored: CurrentUser = serde_json::from_value(json).unwrap();
        assert_eq!(restored.access_token().expose_secret(), "tok.en.value");
        assert!(restored.is_admin());
    }
}
