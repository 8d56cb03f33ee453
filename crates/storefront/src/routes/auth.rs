//! Authentication route handlers.
//!
//! Handles login, signup and logout. Credentials are checked by the REST API;
//! the resulting token and account are kept in the server session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, PageContext, clear_current_user, set_current_user};
use crate::models::{Flash, push_flash};
use crate::services::auth::{
    AuthService, LoginErrors, SignupDetails, SignupErrors, validate_login, validate_signup,
};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub contact_number: String,
}

impl SignupForm {
    fn details(&self) -> SignupDetails<'_> {
        SignupDetails {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            password: &self.password,
            confirm_password: &self.confirm_password,
            contact_number: &self.contact_number,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    /// Email typed in the previous attempt.
    pub email: String,
    pub errors: LoginErrors,
}

/// Signup page template.
///
/// Passwords are never echoed back into the form.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub ctx: PageContext,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: String,
    pub errors: SignupErrors,
}

impl SignupTemplate {
    fn new(ctx: PageContext, form: &SignupForm, errors: SignupErrors) -> Self {
        Self {
            ctx,
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            contact_number: form.contact_number.clone(),
            errors,
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// Already signed-in users go straight to the catalog.
pub async fn login_page(OptionalAuth(user): OptionalAuth, ctx: PageContext) -> Response {
    if user.is_some() {
        return Redirect::to("/products").into_response();
    }

    LoginTemplate {
        ctx,
        email: String::new(),
        errors: LoginErrors::default(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, ctx, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = match validate_login(&form.email, &form.password) {
        Ok(email) => email,
        Err(errors) => {
            return Ok(LoginTemplate {
                ctx,
                email: form.email,
                errors,
            }
            .into_response());
        }
    };

    let password = SecretString::from(form.password);
    match AuthService::new(state.api()).login(&email, &password).await {
        Ok(user) => {
            set_current_user(&session, &user).await?;

            tracing::info!(admin = user.is_admin(), "User logged in");
            Ok(Redirect::to("/products").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(LoginTemplate {
                ctx: ctx.with_flash(Flash::error(e.to_string())),
                email: form.email,
                errors: LoginErrors::default(),
            }
            .into_response())
        }
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(ctx: PageContext) -> impl IntoResponse {
    SignupTemplate::new(ctx, &SignupForm::default(), SignupErrors::default())
}

/// Handle signup form submission.
#[instrument(skip(state, session, ctx, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<SignupForm>,
) -> Response {
    let request = match validate_signup(&form.details()) {
        Ok(request) => request,
        Err(errors) => return SignupTemplate::new(ctx, &form, errors).into_response(),
    };

    match AuthService::new(state.api()).signup(&request).await {
        Ok(()) => {
            tracing::info!("Account created");
            push_flash(&session, Flash::success("Signup successful! Please log in.")).await;
            Redirect::to("/login").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Signup failed");
            SignupTemplate::new(
                ctx.with_flash(Flash::error(e.to_string())),
                &form,
                SignupErrors::default(),
            )
            .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Clears the token, the account and any order in progress.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_user(&session).await?;

    Ok(Redirect::to("/").into_response())
}
