//! Authentication service.
//!
//! Credentials are checked by the REST API; this module validates the login
//! and signup forms, exchanges credentials for a token, and decides whether a
//! stored token is still usable.

mod error;
mod token;

pub use error::AuthError;
pub use token::{SessionCheck, TokenClaims, check_session};

use secrecy::SecretString;
use tracing::instrument;

use eshop_core::{ContactNumber, Email, confirm_password, require_password, validate_password};

use crate::api::{ApiClient, ApiError, SignUpRequest};
use crate::models::CurrentUser;

/// Authentication service.
///
/// Borrows the shared API client for the duration of a request.
pub struct AuthService<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Sign in and build the session identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NoToken` when the API answers without a token and
    /// `AuthError::InvalidCredentials` for every other failure.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<CurrentUser, AuthError> {
        match self.api.sign_in(email.as_str(), password).await {
            Ok(signed_in) => Ok(CurrentUser::new(signed_in.user, &signed_in.token)),
            Err(ApiError::MissingToken) => Err(AuthError::NoToken),
            Err(e) => Err(AuthError::InvalidCredentials(e)),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SignupFailed` if the API rejects the account.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: &SignUpRequest) -> Result<(), AuthError> {
        self.api
            .sign_up(request)
            .await
            .map_err(AuthError::SignupFailed)
    }

    /// Ask the API whether the stored token is still accepted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::VerificationFailed` on any failure, including an
    /// unreachable API.
    #[instrument(skip(self, user), fields(email = %user.email()))]
    pub async fn verify(&self, user: &CurrentUser) -> Result<(), AuthError> {
        self.api
            .health_check(Some(&user.access_token()))
            .await
            .map_err(AuthError::VerificationFailed)
    }
}

// =============================================================================
// Form validation
// =============================================================================

/// Per-field messages for the login form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginErrors {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validate the login form.
///
/// # Errors
///
/// Returns the field messages when the email is malformed or the password is
/// empty.
pub fn validate_login(email: &str, password: &str) -> Result<Email, LoginErrors> {
    let email = Email::parse(email.trim());
    let password = require_password(password);

    match (email, password) {
        (Ok(email), Ok(())) => Ok(email),
        (email, password) => Err(LoginErrors {
            email: email.err().map(|e| e.to_string()),
            password: password.err().map(|e| e.to_string()),
        }),
    }
}

/// Raw signup form values.
#[derive(Debug, Clone, Copy)]
pub struct SignupDetails<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub contact_number: &'a str,
}

/// Per-field messages for the signup form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SignupErrors {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub contact_number: Option<String>,
}

impl SignupErrors {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Validate the signup form and build the API request.
///
/// A confirmation mismatch is reported on the confirm field and policy
/// problems on the password field; both can be set at once.
///
/// # Errors
///
/// Returns the field messages for every invalid field.
pub fn validate_signup(details: &SignupDetails<'_>) -> Result<SignUpRequest, SignupErrors> {
    let first_name = details.first_name.trim();
    let last_name = details.last_name.trim();

    let mut errors = SignupErrors {
        first_name: first_name
            .is_empty()
            .then(|| "First name is required".to_string()),
        last_name: last_name
            .is_empty()
            .then(|| "Last name is required".to_string()),
        ..SignupErrors::default()
    };

    let email = Email::parse(details.email.trim())
        .map_err(|e| errors.email = Some(e.to_string()))
        .ok();

    if let Err(e) = validate_password(details.password) {
        errors.password = Some(e.to_string());
    }
    if let Err(e) = confirm_password(details.password, details.confirm_password) {
        errors.confirm_password = Some(e.to_string());
    }

    let contact = ContactNumber::parse(details.contact_number.trim())
        .map_err(|e| errors.contact_number = Some(e.to_string()))
        .ok();

    match (email, contact) {
        (Some(email), Some(contact)) if errors.is_empty() => Ok(SignUpRequest {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.into_inner(),
            password: details.password.to_owned(),
            contact_number: contact.as_str().to_owned(),
        }),
        _ => Err(errors),
    }
}
