//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page
//! GET  /health                        - Health check
//! GET  /health/ready                  - Readiness (REST API reachable)
//!
//! # Auth
//! GET  /login                         - Login page
//! POST /login                         - Login action (rate limited)
//! GET  /signup                        - Signup page
//! POST /signup                        - Signup action (rate limited)
//! POST /logout                        - Logout action
//!
//! # Products
//! GET  /products                      - Listing (?category, ?sort, ?q)
//! GET  /products/{id}                 - Product detail
//!
//! # Admin
//! GET  /add-product                   - New product form
//! POST /add-product                   - Create product
//! GET  /edit-product/{id}             - Edit product form
//! POST /edit-product/{id}             - Update product
//! GET  /products/{id}/delete          - Delete confirmation
//! POST /products/{id}/delete          - Delete product
//!
//! # Order wizard (requires login)
//! GET  /orders                        - Current step
//! POST /orders/start                  - Start from a product
//! POST /orders/address                - Select address
//! POST /orders/next                   - Next step
//! POST /orders/back                   - Previous step or leave
//! POST /orders/place                  - Place order
//! POST /orders/addresses              - Save new address
//! GET  /orders/addresses/{id}/edit    - Edit address form
//! POST /orders/addresses/{id}         - Update address
//! GET  /orders/addresses/{id}/delete  - Delete confirmation
//! POST /orders/addresses/{id}/delete  - Delete address
//! ```

pub mod admin;
pub mod auth;
pub mod home;
pub mod orders;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::config::StorefrontConfig;
use crate::filters;
use crate::middleware::{PageContext, auth_rate_limiter, expire_session};
use crate::state::AppState;

/// Shown when the API rejects a stored token mid-flow.
pub const RELOGIN_NOTICE: &str = "Your session may have expired. Please login again.";

/// Generic "are you sure?" page for destructive actions.
#[derive(Template, WebTemplate)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub message: String,
    /// Form action the confirm button posts to.
    pub action: String,
    pub cancel_href: String,
}

/// Discard the session and send the user to the login page.
pub(crate) async fn prompt_relogin(session: &Session) -> Response {
    expire_session(session, RELOGIN_NOTICE).await;
    Redirect::to("/login").into_response()
}

/// Create the auth routes router.
///
/// Only the form submissions carry the rate limiter.
pub fn auth_routes(config: &StorefrontConfig) -> Router<AppState> {
    let submissions = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route_layer(auth_rate_limiter(&config.auth));

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/signup", get(auth::signup_page))
        .route("/logout", post(auth::logout))
        .merge(submissions)
}

/// Create the product and admin routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route(
            "/products/{id}/delete",
            get(admin::confirm_delete_product).post(admin::delete_product),
        )
        .route(
            "/add-product",
            get(admin::new_product).post(admin::create_product),
        )
        .route(
            "/edit-product/{id}",
            get(admin::edit_product).post(admin::update_product),
        )
}

/// Create the order wizard routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::show))
        .route("/start", post(orders::start))
        .route("/address", post(orders::select_address))
        .route("/next", post(orders::next))
        .route("/back", post(orders::back))
        .route("/place", post(orders::place))
        .route("/addresses", post(orders::create_address))
        .route("/addresses/{id}", post(orders::update_address))
        .route("/addresses/{id}/edit", get(orders::edit_address))
        .route(
            "/addresses/{id}/delete",
            get(orders::confirm_delete_address).post(orders::delete_address),
        )
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(auth_routes(config))
        .merge(product_routes())
        .nest("/orders", order_routes())
}
