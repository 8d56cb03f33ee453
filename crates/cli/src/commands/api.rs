//! Commands that talk to the upstream REST API.
//!
//! # Usage
//!
//! ```bash
//! # Check that the API answers
//! eshop-cli health
//!
//! # List the catalog the way the storefront would show it
//! eshop-cli products --category Electronics --search phone --sort price-low-to-high
//! ```
//!
//! # Environment Variables
//!
//! Read through the storefront configuration, so `ESHOP_API_BASE_URL` and
//! `ESHOP_API_TIMEOUT_SECS` apply here as well. `--api-url` overrides the
//! base URL.

use thiserror::Error;
use tracing::info;

use eshop_storefront::api::{ApiClient, ApiError};
use eshop_storefront::config::{ConfigError, StorefrontConfig};
use eshop_storefront::services::catalog::{CatalogQuery, CategoryBar, SortOption, categories};

/// Errors that can occur while querying the API.
#[derive(Debug, Error)]
pub enum ApiCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("REST API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid sort option: {0}")]
    InvalidSort(String),
}

fn client(api_url: Option<&str>) -> Result<ApiClient, ApiCommandError> {
    let _ = dotenvy::dotenv();

    let config = StorefrontConfig::from_lookup(|key| match (key, api_url) {
        ("ESHOP_API_BASE_URL", Some(url)) => Some(url.to_owned()),
        _ => std::env::var(key).ok(),
    })?;
    Ok(ApiClient::new(&config.api)?)
}

/// Check that the REST API is reachable.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the API does not answer.
pub async fn health(api_url: Option<&str>) -> Result<(), ApiCommandError> {
    let api = client(api_url)?;
    api.health_check(None).await?;
    info!(api = %api.base_url(), "REST API is reachable");
    Ok(())
}

/// Filters for [`products`].
#[derive(Debug, Default)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

impl ProductFilters {
    fn query(&self, bar: &CategoryBar) -> Result<CatalogQuery, ApiCommandError> {
        let sort = match self.sort.as_deref() {
            Some(raw) => raw
                .parse::<SortOption>()
                .map_err(|_| ApiCommandError::InvalidSort(raw.to_owned()))?,
            None => SortOption::Default,
        };

        Ok(CatalogQuery {
            category: bar.normalize(self.category.as_deref()),
            search: self.search.clone().unwrap_or_default(),
            sort,
        })
    }
}

/// List products after applying the listing filters.
///
/// # Errors
///
/// Returns an error for an unknown sort option or a failed API call.
pub async fn products(
    api_url: Option<&str>,
    filters: &ProductFilters,
) -> Result<(), ApiCommandError> {
    let api = client(api_url)?;
    let all = api.list_products().await?;

    let bar = CategoryBar::new(categories(&all));
    let query = filters.query(&bar)?;
    if filters.category.is_some() && query.category.is_none() {
        tracing::warn!(
            category = filters.category.as_deref().unwrap_or_default(),
            "Unknown category, showing all products"
        );
    }

    let shown = query.apply(&all);
    for product in &shown {
        info!(
            id = %product.id,
            category = %product.category,
            price = %product.price().display(),
            "{}",
            product.name
        );
    }
    info!(shown = shown.len(), total = all.len(), sort = %query.sort, "Listed products");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn bar() -> CategoryBar {
        CategoryBar::new(vec!["Apparel".to_string(), "Electronics".to_string()])
    }

    #[test]
    fn test_query_defaults() {
        let query = ProductFilters::default().query(&bar()).unwrap();
        assert_eq!(query, CatalogQuery::default());
    }

    #[test]
    fn test_query_parses_sort_and_drops_unknown_category() {
        let filters = ProductFilters {
            category: Some("Garden".to_string()),
            search: Some("  lamp ".to_string()),
            sort: Some("price-high-to-low".to_string()),
        };
        let query = filters.query(&bar()).unwrap();
        assert_eq!(query.category, None);
        assert_eq!(query.search, "  lamp ");
        assert_eq!(query.sort, SortOption::PriceHighToLow);
    }

    #[test]
    fn test_query_rejects_unknown_sort() {
        let filters = ProductFilters {
            sort: Some("cheapest".to_string()),
            ..ProductFilters::default()
        };
        assert!(matches!(
            filters.query(&bar()),
            Err(ApiCommandError::InvalidSort(s)) if s == "cheapest"
        ));
    }
}
