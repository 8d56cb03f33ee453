//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use eshop_core::{Product, ProductId};

use crate::api::ApiError;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::Flash;
use crate::services::catalog::{CatalogQuery, CategoryBar, SortOption, categories};
use crate::services::checkout::QUANTITY_RANGE;
use crate::state::AppState;

/// Image shown for products without one.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

/// Product card data for the listing grid.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.short_description(Product::CARD_DESCRIPTION_CHARS),
            price: product.price().display(),
            image_url: product.image_url_or(PLACEHOLDER_IMAGE).to_owned(),
        }
    }
}

/// Product detail data.
#[derive(Clone)]
pub struct ProductDetail {
    pub id: String,
    pub name: String,
    pub category: String,
    pub manufacturer: String,
    pub available_items: u32,
    /// Full description.
    pub description: String,
    /// Collapsed description; equal to the full one when short.
    pub summary: String,
    pub has_long_description: bool,
    pub price: String,
    pub image_url: String,
}

impl From<&Product> for ProductDetail {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category.clone(),
            manufacturer: product.manufacturer.clone(),
            available_items: product.available_items,
            description: product.description_text().to_owned(),
            summary: product.short_description(Product::COLLAPSE_DESCRIPTION_CHARS),
            has_long_description: product.has_long_description(),
            price: product.price().display(),
            image_url: product.image_url_or(PLACEHOLDER_IMAGE).to_owned(),
        }
    }
}

/// One entry of the category toggle bar.
pub struct CategoryLink {
    pub label: String,
    pub href: String,
    pub active: bool,
}

/// One entry of the sort dropdown.
pub struct SortChoice {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub q: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub all_link: CategoryLink,
    pub categories: Vec<CategoryLink>,
    pub more_categories: Vec<CategoryLink>,
    /// Whether the selected category sits in the overflow menu.
    pub more_active: bool,
    pub sort_choices: Vec<SortChoice>,
    pub category: Option<String>,
    pub search: String,
    pub products: Vec<ProductCard>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: Option<ProductDetail>,
    pub min_quantity: u32,
    pub max_quantity: u32,
}

/// Listing URL with the given filter state.
#[must_use]
pub fn listing_url(category: Option<&str>, sort: SortOption, search: &str) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(category) = category {
        query.append_pair("category", category);
    }
    if sort != SortOption::Default {
        query.append_pair("sort", sort.as_str());
    }
    if !search.is_empty() {
        query.append_pair("q", search);
    }
    let query = query.finish();

    if query.is_empty() {
        "/products".to_string()
    } else {
        format!("/products?{query}")
    }
}

/// Display product listing page.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let (products, ctx) = match state.api().list_products().await {
        Ok(products) => (products, ctx),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products");
            (Vec::new(), ctx.with_flash(Flash::error("Failed to load products")))
        }
    };

    let bar = CategoryBar::new(categories(&products));
    let catalog = CatalogQuery {
        category: bar.normalize(query.category.as_deref()),
        search: query.q.unwrap_or_default(),
        sort: SortOption::parse_lenient(query.sort.as_deref()),
    };

    let link = |name: &str| CategoryLink {
        label: name.to_owned(),
        href: listing_url(Some(name), catalog.sort, &catalog.search),
        active: catalog.category.as_deref() == Some(name),
    };

    ProductsIndexTemplate {
        all_link: CategoryLink {
            label: "All".to_string(),
            href: listing_url(None, catalog.sort, &catalog.search),
            active: catalog.category.is_none(),
        },
        categories: bar.visible.iter().map(|c| link(c)).collect(),
        more_categories: bar.overflow.iter().map(|c| link(c)).collect(),
        more_active: catalog
            .category
            .as_ref()
            .is_some_and(|c| bar.overflow.contains(c)),
        sort_choices: SortOption::ALL
            .iter()
            .map(|&option| SortChoice {
                value: option.as_str(),
                label: option.label(),
                selected: option == catalog.sort,
            })
            .collect(),
        products: catalog.apply(&products).into_iter().map(ProductCard::from).collect(),
        category: catalog.category.clone(),
        search: catalog.search.clone(),
        ctx,
    }
}

/// Display product detail page.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = ProductId::new(id);

    let (product, ctx) = match state.api().get_product(&id).await {
        Ok(product) => (Some(ProductDetail::from(&product)), ctx),
        Err(ApiError::NotFound(_)) => (None, ctx.with_flash(Flash::error("Product not found."))),
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Failed to load product");
            (
                None,
                ctx.with_flash(Flash::error(
                    "Failed to load product details. Please try again later.",
                )),
            )
        }
    };

    ProductShowTemplate {
        ctx,
        product,
        min_quantity: *QUANTITY_RANGE.start(),
        max_quantity: *QUANTITY_RANGE.end(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(description: &str, image: Option<&str>) -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Desk Lamp".to_string(),
            category: "Furniture".to_string(),
            manufacturer: "Acme".to_string(),
            price: Decimal::new(12500, 2),
            available_items: 4,
            image_url: image.map(String::from),
            description: Some(description.to_string()),
        }
    }

    #[test]
    fn test_card_truncates_description_and_uses_placeholder() {
        let card = ProductCard::from(&product(&"x".repeat(120), None));
        assert_eq!(card.description.chars().count(), 103);
        assert!(card.description.ends_with("..."));
        assert_eq!(card.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(card.price, "₹125");
    }

    #[test]
    fn test_detail_collapses_long_description() {
        let short = ProductDetail::from(&product("Bright.", Some("https://img.example/l.png")));
        assert!(!short.has_long_description);
        assert_eq!(short.summary, "Bright.");
        assert_eq!(short.image_url, "https://img.example/l.png");

        let long = ProductDetail::from(&product(&"y".repeat(151), None));
        assert!(long.has_long_description);
        assert_eq!(long.summary.chars().count(), 153);
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(listing_url(None, SortOption::Default, ""), "/products");
        assert_eq!(
            listing_url(Some("Personal Care"), SortOption::Newest, "a&b"),
            "/products?category=Personal+Care&sort=newest&q=a%26b"
        );
    }
}
