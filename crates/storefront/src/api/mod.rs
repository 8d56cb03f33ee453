//! Client for the upstream E-Shop REST API.
//!
//! # Architecture
//!
//! - The REST API is the source of truth: no local storage, no caching
//! - Authenticated calls send the token in the `x-auth-token` header
//! - Non-success statuses are classified into [`ApiError`] variants so
//!   handlers can turn them into user-facing notices
//!
//! # Example
//!
//! ```rust,ignore
//! use eshop_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let products = client.list_products().await?;
//! let signed_in = client.sign_in("user@example.com", &password).await?;
//! let addresses = client.list_addresses(&signed_in.token).await?;
//! ```

pub mod types;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use eshop_core::{Address, AddressId, AddressInput, Product, ProductId, ProductInput, User};

use crate::config::ApiConfig;

pub use types::{OrderRequest, SignInRequest, SignUpRequest, SignedIn};
use types::{Created, ErrorBody};

/// Header carrying the session token in both directions.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Number of body characters kept when logging upstream failures.
const LOGGED_BODY_CHARS: usize = 500;

/// Errors that can occur when calling the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request path could not be joined onto the base URL.
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// The token was missing, expired or rejected (HTTP 401).
    #[error("Unauthorized")]
    Unauthorized,

    /// The account lacks the required role (HTTP 403).
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("API returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// Sign in succeeded but no `x-auth-token` header came back.
    #[error("Authentication failed! No token received.")]
    MissingToken,
}

impl ApiError {
    /// Human readable message supplied by the API, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Short reason used in notices such as "Failed to save address: ...".
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected {
                status,
                message: None,
            } => status.to_string(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.as_u16().to_string(),
            Self::Forbidden => StatusCode::FORBIDDEN.as_u16().to_string(),
            Self::NotFound(_) => StatusCode::NOT_FOUND.as_u16().to_string(),
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS.as_u16().to_string(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the upstream REST API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("eshop-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a request for `path`, attaching the token when given.
    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let builder = self.inner.client.request(method, url);
        Ok(match token {
            Some(token) => builder.header(AUTH_TOKEN_HEADER, token.expose_secret()),
            None => builder,
        })
    }

    /// Send a request and classify non-success statuses.
    async fn send(builder: RequestBuilder, resource: &str) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            status = %status,
            resource,
            body = %body.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
            "REST API returned non-success status"
        );

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            StatusCode::NOT_FOUND => ApiError::NotFound(resource.to_string()),
            _ => ApiError::Rejected {
                status: status.as_u16(),
                message: serde_json::from_str::<ErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.message)
                    .filter(|m| !m.trim().is_empty()),
            },
        })
    }

    /// Parse a JSON body, logging the payload on failure.
    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
                "Failed to parse REST API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a token.
    ///
    /// The token arrives in the `x-auth-token` response header and the account
    /// in the body. When the body omits the email, the submitted one is used.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` when the API accepts the credentials
    /// without issuing a token, or the classified status otherwise.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<SignedIn, ApiError> {
        let body = SignInRequest {
            username: email,
            password: password.expose_secret(),
        };
        let request = self
            .request(Method::POST, "/api/auth/signin", None)?
            .json(&body);
        let response = Self::send(request, "signin").await?;

        let token = response
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.to_owned()));

        let text = response.text().await?;
        let Some(token) = token else {
            return Err(ApiError::MissingToken);
        };

        let mut user: User = if text.trim().is_empty() {
            serde_json::from_str("{}")?
        } else {
            serde_json::from_str(&text)?
        };
        if user.email.is_empty() {
            email.clone_into(&mut user.email);
        }

        Ok(SignedIn { token, user })
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns the classified status if the API rejects the signup.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/api/auth/signup", None)?
            .json(request);
        Self::send(builder, "signup").await?;
        Ok(())
    }

    /// Check that the API is reachable and, when a token is given, that it is
    /// still accepted.
    ///
    /// # Errors
    ///
    /// Returns an error for any transport failure or non-success status.
    #[instrument(skip(self, token))]
    pub async fn health_check(&self, token: Option<&SecretString>) -> Result<(), ApiError> {
        let request = self.request(Method::GET, "/api/auth/health-check", token)?;
        Self::send(request, "health-check").await?;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch every product, in server order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "/api/products", None)?;
        let response = Self::send(request, "products").await?;
        Self::json(response).await
    }

    /// Fetch one product.
    ///
    /// A `null` body is reported as `ApiError::NotFound`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product does not exist.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let path = format!("/api/products/{}", urlencoding::encode(id.as_str()));
        let request = self.request(Method::GET, &path, None)?;
        let response = Self::send(request, &format!("product {id}")).await?;
        let product: Option<Product> = Self::json(response).await?;
        product.ok_or_else(|| ApiError::NotFound(format!("product {id}")))
    }

    /// Create a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns the classified status if the API rejects the product.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        token: &SecretString,
        input: &ProductInput,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/api/products", Some(token))?
            .json(input);
        Self::send(request, "products").await?;
        Ok(())
    }

    /// Replace a product (admin only). The id is repeated in the body.
    ///
    /// # Errors
    ///
    /// Returns the classified status if the API rejects the update.
    #[instrument(skip(self, token, input))]
    pub async fn update_product(
        &self,
        token: &SecretString,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<(), ApiError> {
        let mut body = input.clone();
        body.id = Some(id.clone());

        let path = format!("/api/products/{}", urlencoding::encode(id.as_str()));
        let request = self.request(Method::PUT, &path, Some(token))?.json(&body);
        Self::send(request, &format!("product {id}")).await?;
        Ok(())
    }

    /// Delete a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns the classified status if the API refuses the deletion.
    #[instrument(skip(self, token))]
    pub async fn delete_product(&self, token: &SecretString, id: &ProductId) -> Result<(), ApiError> {
        let path = format!("/api/products/{}", urlencoding::encode(id.as_str()));
        let request = self.request(Method::DELETE, &path, Some(token))?;
        Self::send(request, &format!("product {id}")).await?;
        Ok(())
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Fetch the signed-in user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an address list.
    #[instrument(skip(self, token))]
    pub async fn list_addresses(&self, token: &SecretString) -> Result<Vec<Address>, ApiError> {
        let request = self.request(Method::GET, "/api/addresses", Some(token))?;
        let response = Self::send(request, "addresses").await?;
        Self::json(response).await
    }

    /// Save a new address and return its id.
    ///
    /// # Errors
    ///
    /// Returns the classified status if the API rejects the address.
    #[instrument(skip(self, token, input))]
    pub async fn create_address(
        &self,
        token: &SecretString,
        input: &AddressInput,
    ) -> Result<AddressId, ApiError> {
        let request = self
            .request(Method::POST, "/api/addresses", Some(token))?
            .json(input);
        let response = Self::send(request, "addresses").await?;
        let created: Created = Self::json(response).await?;
        Ok(AddressId::new(created.into_id()))
    }

    /// Replace an address. The id is repeated in the body.
    ///
    /// # Errors
    ///
    /// Returns the classified status if the API rejects the update.
    #[instrument(skip(self, token, input))]
    pub async fn update_address(
        &self,
        token: &SecretString,
        id: &AddressId,
        input: &AddressInput,
    ) -> Result<(), ApiError> {
        let mut body = input.clone();
        body.id = Some(id.clone());

        let path = format!("/api/addresses/{}", urlencoding::encode(id.as_str()));
        let request = self.request(Method::PUT, &path, Some(token))?.json(&body);
        Self::send(request, &format!("address {id}")).await?;
        Ok(())
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns the classified status if the API refuses the deletion.
    #[instrument(skip(self, token))]
    pub async fn delete_address(&self, token: &SecretString, id: &AddressId) -> Result<(), ApiError> {
        let path = format!("/api/addresses/{}", urlencoding::encode(id.as_str()));
        let request = self.request(Method::DELETE, &path, Some(token))?;
        Self::send(request, &format!("address {id}")).await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place one order line.
    ///
    /// # Errors
    ///
    /// Returns the classified status if the API rejects the order.
    #[instrument(skip(self, token, order), fields(product = %order.product, quantity = order.quantity))]
    pub async fn place_order(&self, token: &SecretString, order: &OrderRequest) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/api/orders", Some(token))?
            .json(order);
        Self::send(request, "orders").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        assert_eq!(ApiError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(
            ApiError::NotFound("product p1".to_string()).to_string(),
            "Not found: product p1"
        );
        assert_eq!(
            ApiError::Rejected {
                status: 400,
                message: Some("Price is required".to_string())
            }
            .to_string(),
            "API returned 400: Price is required"
        );
        assert_eq!(
            ApiError::Rejected {
                status: 500,
                message: None
            }
            .to_string(),
            "API returned 500"
        );
        assert_eq!(
            ApiError::MissingToken.to_string(),
            "Authentication failed! No token received."
        );
    }

    #[test]
    fn test_server_message_and_reason() {
        let rejected = ApiError::Rejected {
            status: 400,
            message: Some("Duplicate name".to_string()),
        };
        assert_eq!(rejected.server_message(), Some("Duplicate name"));
        assert_eq!(rejected.reason(), "Duplicate name");

        let bare = ApiError::Rejected {
            status: 502,
            message: None,
        };
        assert_eq!(bare.server_message(), None);
        assert_eq!(bare.reason(), "502");
        assert_eq!(ApiError::Unauthorized.reason(), "401");
    }
}
