//! Integration tests for the E-Shop storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eshop-integration-tests
//! ```
//!
//! Each test starts its own fake REST API and storefront on ephemeral ports,
//! so tests run in parallel without shared state and without network access.
//!
//! # Test Categories
//!
//! - `auth` - Login, signup, logout and rate limiting
//! - `catalog` - Listing filters and product detail
//! - `admin` - Product editor access and CRUD
//! - `orders` - Order wizard and address book
//! - `session` - Token expiry and health endpoints

pub mod fake_api;

use std::net::SocketAddr;

use reqwest::Client;
use tokio::net::TcpListener;

use eshop_storefront::config::StorefrontConfig;
use eshop_storefront::state::AppState;

pub use fake_api::FakeApi;

/// A running storefront wired to a fake REST API.
pub struct TestContext {
    /// Cookie-keeping client; follows redirects.
    pub client: Client,
    pub storefront_url: String,
    pub api: FakeApi,
}

impl TestContext {
    /// Start with a generous login rate limit.
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Start with extra storefront environment variables.
    ///
    /// # Panics
    ///
    /// Panics if a listener cannot be bound or the configuration is invalid.
    pub async fn with_env(overrides: &[(&str, &str)]) -> Self {
        let api = FakeApi::seeded();
        let api_url = serve(api.router()).await;

        let lookup = |key: &str| {
            overrides
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
                .or_else(|| match key {
                    "ESHOP_API_BASE_URL" => Some(api_url.clone()),
                    "ESHOP_API_TIMEOUT_SECS" => Some("5".to_string()),
                    "ESHOP_AUTH_RATE_PER_SECOND" => Some("1".to_string()),
                    "ESHOP_AUTH_RATE_BURST" => Some("1000".to_string()),
                    _ => None,
                })
        };
        let config = StorefrontConfig::from_lookup(lookup).expect("Invalid test configuration");
        let state = AppState::new(config).expect("Failed to build application state");
        let storefront_url = serve(eshop_storefront::app(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            storefront_url,
            api,
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET `path` and return the final status, URL path and body.
    pub async fn get(&self, path: &str) -> Page {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        Page::read(response).await
    }

    /// POST a form to `path` and return the page after redirects.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Page {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed");
        Page::read(response).await
    }

    /// Sign in through the login form.
    pub async fn login(&self, email: &str, password: &str) -> Page {
        self.post("/login", &[("email", email), ("password", password)])
            .await
    }
}

/// A fetched page.
#[derive(Debug)]
pub struct Page {
    pub status: reqwest::StatusCode,
    /// Path of the final URL after redirects.
    pub path: String,
    pub body: String,
}

impl Page {
    async fn read(response: reqwest::Response) -> Self {
        let status = response.status();
        let path = response.url().path().to_string();
        let body = response.text().await.expect("Failed to read body");
        Self { status, path, body }
    }

    /// Whether the rendered page shows `text`.
    #[must_use]
    pub fn shows(&self, text: &str) -> bool {
        self.body.contains(text)
    }
}

/// Serve `router` on an ephemeral port and return its base URL.
async fn serve(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    });

    format!("http://{addr}")
}
