//! Local inspection of session tokens.
//!
//! Tokens are JWTs issued by the REST API. The storefront never verifies the
//! signature; it only reads the payload to learn when the token expires, so a
//! session can be ended without a round trip.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::AuthError;

/// Claims read from the token payload.
///
/// Only `exp` decides anything. Claims of an unexpected type are read as
/// absent rather than rejecting the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenClaims {
    /// Subject, usually the account email.
    #[serde(default, deserialize_with = "lenient_subject")]
    pub sub: Option<String>,
    /// Issued-at, seconds since the epoch.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub iat: Option<f64>,
    /// Expiry, seconds since the epoch.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub exp: Option<f64>,
}

fn lenient_subject<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Epoch seconds from a number or a numeric string.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|secs: &f64| secs.is_finite()))
}

impl TokenClaims {
    /// Decode the payload segment of `token`.
    ///
    /// Both the URL-safe and the standard base64 alphabets are accepted, with
    /// or without padding.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedToken` if there is no payload segment or it
    /// is not base64-encoded JSON.
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let payload = token
            .split('.')
            .nth(1)
            .map(|p| p.trim_end_matches('='))
            .filter(|p| !p.is_empty())
            .ok_or(AuthError::MalformedToken)?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .or_else(|_| STANDARD_NO_PAD.decode(payload))
            .map_err(|_| AuthError::MalformedToken)?;

        serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
    }

    /// Expiry as a timestamp, if the token carries one.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        #[allow(clippy::cast_possible_truncation)] // exp is seconds; millisecond precision is enough
        let millis = (self.exp? * 1000.0) as i64;
        Utc.timestamp_millis_opt(millis).single()
    }

    /// Whether the token expired before `now`.
    ///
    /// Compared at millisecond precision. A token without `exp` never expires
    /// locally.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        #[allow(clippy::cast_precision_loss)] // current epoch millis fit in f64 exactly
        let now_millis = now.timestamp_millis() as f64;
        self.exp.is_some_and(|exp| exp * 1000.0 < now_millis)
    }
}

/// Outcome of checking a stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    /// Token is current and was verified recently.
    Valid,
    /// Token is current locally but the API should confirm it again.
    NeedsVerification,
    /// Token is past its expiry.
    Expired,
    /// Token could not be decoded.
    Malformed,
}

/// Decide what to do with a stored token.
///
/// `verified_at` is when the API last accepted the token; `None` means never.
#[must_use]
pub fn check_session(
    token: &str,
    verified_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    recheck_interval: Duration,
) -> SessionCheck {
    let claims = match TokenClaims::decode(token) {
        Ok(claims) => claims,
        Err(_) => return SessionCheck::Malformed,
    };

    if claims.is_expired_at(now) {
        return SessionCheck::Expired;
    }

    let recheck = chrono::Duration::from_std(recheck_interval).unwrap_or(chrono::Duration::MAX);
    match verified_at {
        Some(at) if now.signed_duration_since(at) < recheck => SessionCheck::Valid,
        _ => SessionCheck::NeedsVerification,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Build an unsigned token with the given JSON payload.
    pub(crate) fn token_with(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.signature",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn test_decode_claims() {
        let claims = TokenClaims::decode(&token_with(
            r#"{"sub":"user@example.com","iat":1700000000,"exp":1700003600}"#,
        ))
        .unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user@example.com"));
        assert_eq!(claims.expires_at(), Some(at(1_700_003_600)));
    }

    #[test]
    fn test_decode_accepts_standard_alphabet_with_padding() {
        use base64::engine::general_purpose::STANDARD;

        let payload = STANDARD.encode(r#"{"exp":1}"#);
        assert!(payload.ends_with('='));
        let claims = TokenClaims::decode(&format!("h.{payload}.s")).unwrap();
        assert_eq!(claims.exp, Some(1.0));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(TokenClaims::decode("no-dots-at-all").is_err());
        assert!(TokenClaims::decode("header..sig").is_err());
        assert!(TokenClaims::decode("header.!!!.sig").is_err());
        assert!(TokenClaims::decode(&token_with("not json")).is_err());
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = TokenClaims {
            exp: Some(1000.0),
            ..TokenClaims::default()
        };
        // exp * 1000 < now is expired; equal is still valid
        assert!(!claims.is_expired_at(at(1000)));
        assert!(claims.is_expired_at(Utc.timestamp_millis_opt(1_000_001).single().unwrap()));
    }

    #[test]
    fn test_missing_exp_never_expires() {
        let claims = TokenClaims::default();
        assert!(!claims.is_expired_at(at(i64::from(i32::MAX))));
        assert!(claims.expires_at().is_none());
    }

    #[test]
    fn test_check_session() {
        let token = token_with(r#"{"exp":2000}"#);
        let recheck = Duration::from_secs(300);

        assert_eq!(
            check_session(&token, None, at(1000), recheck),
            SessionCheck::NeedsVerification
        );
        assert_eq!(
            check_session(&token, Some(at(900)), at(1000), recheck),
            SessionCheck::Valid
        );
        assert_eq!(
            check_session(&token, Some(at(600)), at(1000), recheck),
            SessionCheck::NeedsVerification
        );
        assert_eq!(
            check_session(&token, Some(at(1999)), at(2001), recheck),
            SessionCheck::Expired
        );
        assert_eq!(
            check_session("garbage", Some(at(1000)), at(1000), recheck),
            SessionCheck::Malformed
        );
    }

    #[test]
    fn test_odd_claim_types_do_not_invalidate_token() {
        let claims =
            TokenClaims::decode(&token_with(r#"{"sub":42,"iat":"soon","exp":"2000"}"#)).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.iat, None);
        assert_eq!(claims.exp, Some(2000.0));

        let recheck = Duration::from_secs(300);
        let token = token_with(r#"{"sub":42,"exp":99999999999}"#);
        assert_eq!(
            check_session(&token, Some(at(1000)), at(1000), recheck),
            SessionCheck::Valid
        );

        let token = token_with(r#"{"sub":{"email":"a@b.co"},"iat":[1],"exp":null}"#);
        assert_eq!(
            check_session(&token, Some(at(1000)), at(1000), recheck),
            SessionCheck::Valid
        );
    }

    #[test]
    fn test_zero_recheck_always_verifies() {
        let token = token_with(r#"{"sub":"a"}"#);
        assert_eq!(
            check_session(&token, Some(at(1000)), at(1000), Duration::ZERO),
            SessionCheck::NeedsVerification
        );
    }
}
