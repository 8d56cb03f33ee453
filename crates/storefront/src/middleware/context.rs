//! Per-page template context.
//!
//! [`PageContext`] bundles what every page renders outside its own content:
//! the header state derived from the session and path, and the pending flash
//! notice (taken out of the session, so it shows once).

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{CurrentUser, Flash, session_keys, take_flash};

/// Header state for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderView {
    pub logged_in: bool,
    pub is_admin: bool,
    pub user_name: Option<String>,
    /// Search box is hidden on the auth pages.
    pub show_search: bool,
    /// Current `q` value, echoed into the search box.
    pub search: String,
    /// Current `category`, kept when searching from the listing.
    pub category: Option<String>,
    pub home_label: &'static str,
    pub home_href: &'static str,
    /// Signup link next to LOGIN on the auth pages.
    pub show_signup: bool,
}

impl HeaderView {
    /// Derive the header for `path` with the given query string.
    #[must_use]
    pub fn derive(path: &str, query: Option<&str>, user: Option<&CurrentUser>) -> Self {
        let on_auth_page = matches!(path, "/login" | "/signup");
        let logged_in = user.is_some();

        let (home_label, home_href) = if logged_in && path == "/" {
            ("Products Page", "/products")
        } else {
            ("Home", "/")
        };

        let mut search = String::new();
        let mut category = None;
        if path == "/products" {
            for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
                match key.as_ref() {
                    "q" => search = value.into_owned(),
                    "category" if !value.is_empty() => category = Some(value.into_owned()),
                    _ => {}
                }
            }
        }

        Self {
            logged_in,
            is_admin: user.is_some_and(CurrentUser::is_admin),
            user_name: user.map(|u| u.user.display_name().to_owned()),
            show_search: !on_auth_page,
            search,
            category,
            home_label,
            home_href,
            show_signup: on_auth_page && !logged_in,
        }
    }
}

/// Everything the base template needs.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub header: HeaderView,
    /// Notices for this render, oldest first.
    pub flashes: Vec<Flash>,
}

impl PageContext {
    /// Add a notice after any carried over from the previous request.
    #[must_use]
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flashes.push(flash);
        self
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self {
                header: HeaderView::derive(parts.uri.path(), parts.uri.query(), None),
                flashes: Vec::new(),
            });
        };

        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();

        Ok(Self {
            header: HeaderView::derive(parts.uri.path(), parts.uri.query(), user.as_ref()),
            flashes: take_flash(&session).await.into_iter().collect(),
        })
    }
}
