//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in user (or an admin) in route
//! handlers, the session helpers used at login and logout, and the session
//! guard that retires expired tokens.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, Flash, push_flash, session_keys};
use crate::services::auth::{AuthService, SessionCheck, check_session};
use crate::state::AppState;

/// Notice shown when the guard ends a session.
pub const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please login again.";

/// Extractor that requires a signed-in user.
///
/// If nobody is logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in admin.
///
/// Anyone else is sent to the home page.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when the request lacks the required identity.
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// Redirect to the home page (signed in, but not allowed).
    RedirectHome,
    /// Session layer missing.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::Unavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Read the stored user, if any.
async fn stored_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<Session>().is_none() {
            return Err(AuthRejection::Unavailable);
        }

        stored_user(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match stored_user(parts).await {
            Some(user) if user.is_admin() => Ok(Self(user)),
            _ => Err(AuthRejection::RedirectHome),
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(stored_user(parts).await))
    }
}

/// Store the signed-in user and mark the token as freshly verified.
///
/// The session id is rotated to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    session
        .insert(session_keys::AUTH_VERIFIED_AT, Utc::now())
        .await?;

    set_sentry_user(user.user.id.as_ref(), Some(user.email()));
    Ok(())
}

/// Remove the user, token and order draft from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session.remove_value(session_keys::AUTH_VERIFIED_AT).await?;
    session.remove_value(session_keys::ORDER_DRAFT).await?;

    clear_sentry_user();
    Ok(())
}

/// End the session and leave `notice` for the next page.
pub async fn expire_session(session: &Session, notice: &str) {
    if let Err(e) = clear_current_user(session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    push_flash(session, Flash::warning(notice)).await;
}

/// Check the stored token before the request reaches a handler.
///
/// - Expired or undecodable tokens end the session.
/// - Tokens not confirmed within the recheck interval are confirmed against
///   the API; any failure ends the session.
///
/// Must run inside the session layer.
pub async fn session_guard(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path.starts_with("/static") || path.starts_with("/health") {
        return next.run(request).await;
    }

    let user = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten();

    if let Some(user) = user {
        let verified_at = session
            .get::<DateTime<Utc>>(session_keys::AUTH_VERIFIED_AT)
            .await
            .ok()
            .flatten();

        let check = check_session(
            user.raw_token(),
            verified_at,
            Utc::now(),
            state.config().auth.recheck_interval,
        );

        match check {
            SessionCheck::Valid => {}
            SessionCheck::Expired | SessionCheck::Malformed => {
                tracing::info!(email = %user.email(), ?check, "Ending session with unusable token");
                expire_session(&session, SESSION_EXPIRED_NOTICE).await;
            }
            SessionCheck::NeedsVerification => {
                match AuthService::new(state.api()).verify(&user).await {
                    Ok(()) => {
                        if let Err(e) = session
                            .insert(session_keys::AUTH_VERIFIED_AT, Utc::now())
                            .await
                        {
                            tracing::error!(error = %e, "Failed to record token verification");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(email = %user.email(), error = %e, "Session verification failed");
                        expire_session(&session, SESSION_EXPIRED_NOTICE).await;
                    }
                }
            }
        }
    }

    next.run(request).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;
    use tower_sessions::MemoryStore;

    use eshop_core::{Role, User};

    use super::*;
    use crate::models::take_flash;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn user() -> CurrentUser {
        CurrentUser::new(
            User {
                id: None,
                name: None,
                email: "user@example.com".to_string(),
                roles: vec![Role::User],
            },
            &SecretString::from("a.b.c"),
        )
    }

    #[tokio::test]
    async fn test_set_then_clear_current_user() {
        let session = session();
        set_current_user(&session, &user()).await.unwrap();
        session
            .insert(session_keys::ORDER_DRAFT, "draft")
            .await
            .unwrap();

        let stored: Option<CurrentUser> = session.get(session_keys::CURRENT_USER).await.unwrap();
        assert_eq!(stored.unwrap().email(), "user@example.com");
        assert!(
            session
                .get::<DateTime<Utc>>(session_keys::AUTH_VERIFIED_AT)
                .await
                .unwrap()
                .is_some()
        );

        clear_current_user(&session).await.unwrap();
        let stored: Option<CurrentUser> = session.get(session_keys::CURRENT_USER).await.unwrap();
        assert!(stored.is_none());
        assert!(
            session
                .get_value(session_keys::ORDER_DRAFT)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_expire_session_leaves_notice() {
        let session = session();
        set_current_user(&session, &user()).await.unwrap();

        expire_session(&session, SESSION_EXPIRED_NOTICE).await;

        let flash = take_flash(&session).await.unwrap();
        assert_eq!(flash.message, SESSION_EXPIRED_NOTICE);
        assert!(
            session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .unwrap()
                .is_none()
        );
    }
}
