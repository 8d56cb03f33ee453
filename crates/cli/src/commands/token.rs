//! Session token inspection.
//!
//! Decodes the payload of a token issued by the REST API, without verifying
//! the signature, and reports its subject and expiry.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use eshop_storefront::services::auth::{AuthError, TokenClaims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Could not decode token: {0}")]
    Decode(#[from] AuthError),
}

/// What `inspect` learned about a token.
#[derive(Debug, PartialEq)]
pub struct TokenReport {
    pub subject: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
}

/// Summarize `token` as seen at `now`.
///
/// # Errors
///
/// Returns an error if the token has no decodable payload.
pub fn report(token: &str, now: DateTime<Utc>) -> Result<TokenReport, TokenError> {
    let claims = TokenClaims::decode(token.trim())?;

    Ok(TokenReport {
        expired: claims.is_expired_at(now),
        expires_at: claims.expires_at(),
        subject: claims.sub,
    })
}

/// Print what the storefront would conclude about `token` right now.
///
/// # Errors
///
/// Returns an error if the token has no decodable payload.
pub fn inspect(token: &str) -> Result<(), TokenError> {
    let report = report(token, Utc::now())?;

    info!(
        subject = report.subject.as_deref().unwrap_or("-"),
        expires_at = %report
            .expires_at
            .map_or_else(|| "never".to_string(), |at| at.to_rfc3339()),
        expired = report.expired,
        "Token payload"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    // {"sub":"a@b.co","exp":1700000000}
    const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJhQGIuY28iLCJleHAiOjE3MDAwMDAwMDB9.sig";

    #[test]
    fn test_report_before_and_after_expiry() {
        let before = Utc.timestamp_opt(1_699_999_000, 0).unwrap();
        let report_before = report(TOKEN, before).unwrap();
        assert_eq!(report_before.subject.as_deref(), Some("a@b.co"));
        assert!(!report_before.expired);
        assert_eq!(
            report_before.expires_at,
            Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );

        let after = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
        assert!(report(TOKEN, after).unwrap().expired);
    }

    #[test]
    fn test_report_rejects_garbage() {
        assert!(report("not-a-token", Utc::now()).is_err());
    }
}
