//! Password policy for account signup.

/// Special characters a password may (and must) contain.
pub const PASSWORD_SPECIALS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password policy violations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    /// No password was entered.
    #[error("Password is required")]
    Empty,
    /// The password does not satisfy the signup policy.
    #[error(
        "Password must be atleast 6 characters long, include one uppercase letter, one number, and one special symbol"
    )]
    Weak,
    /// Confirmation field differs from the password.
    #[error("Passwords do not match")]
    Mismatch,
}

/// Check that a password is present (login form).
///
/// # Errors
///
/// Returns `PasswordError::Empty` for an empty password.
pub const fn require_password(password: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        Err(PasswordError::Empty)
    } else {
        Ok(())
    }
}

/// Validate a new password against the signup policy.
///
/// The password must be at least six characters, drawn only from ASCII
/// letters, digits and `@$!%*?&`, and contain at least one uppercase letter,
/// one digit and one of those special characters.
///
/// ```
/// use eshop_core::validate_password;
///
/// assert!(validate_password("Secret1!").is_ok());
/// assert!(validate_password("secret1!").is_err()); // no uppercase
/// ```
///
/// # Errors
///
/// Returns `PasswordError::Empty` or `PasswordError::Weak`.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    require_password(password)?;

    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(&c);

    let strong = password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(&c));

    if strong {
        Ok(())
    } else {
        Err(PasswordError::Weak)
    }
}

/// Check that the confirmation field repeats the password.
///
/// Independent of the policy check, so a weak password that was also
/// mistyped reports both problems.
///
/// # Errors
///
/// Returns `PasswordError::Mismatch` when the two differ.
pub fn confirm_password(password: &str, confirm: &str) -> Result<(), PasswordError> {
    if password == confirm {
        Ok(())
    } else {
        Err(PasswordError::Mismatch)
    }
}
