//! Product listing: category bar, search, and sort.
//!
//! Everything here works on the product list as the API returned it; the
//! listing is fetched fresh on every page view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use eshop_core::Product;

/// Categories shown directly in the toggle bar; the rest go in "more".
pub const MAX_VISIBLE_CATEGORIES: usize = 8;

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    /// Server order.
    #[default]
    Default,
    PriceLowToHigh,
    PriceHighToLow,
    /// Reverse of server order.
    Newest,
}

impl SortOption {
    pub const ALL: [Self; 4] = [
        Self::Default,
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
        Self::Newest,
    ];

    /// Query string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceLowToHigh => "priceLowToHigh",
            Self::PriceHighToLow => "priceHighToLow",
            Self::Newest => "newest",
        }
    }

    /// Label for the sort dropdown.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::PriceLowToHigh => "Price: Low to High",
            Self::PriceHighToLow => "Price: High to Low",
            Self::Newest => "Newest",
        }
    }

    /// Parse a query value, falling back to [`SortOption::Default`].
    #[must_use]
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized sort key.
#[derive(Debug, thiserror::Error)]
#[error("unknown sort option: {0}")]
pub struct UnknownSort(String);

impl FromStr for SortOption {
    type Err = UnknownSort;

    /// Accepts the camelCase query values and their kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "default" => Ok(Self::Default),
            "priceLowToHigh" | "price-low-to-high" => Ok(Self::PriceLowToHigh),
            "priceHighToLow" | "price-high-to-low" => Ok(Self::PriceHighToLow),
            "newest" => Ok(Self::Newest),
            other => Err(UnknownSort(other.to_owned())),
        }
    }
}

/// Filter and sort settings for one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Selected category; `None` means all.
    pub category: Option<String>,
    /// Case-insensitive name substring, matched as typed.
    pub search: String,
    pub sort: SortOption,
}

impl CatalogQuery {
    /// Products matching the category and search, in the requested order.
    ///
    /// Price sorts are stable, so equal prices keep server order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let needle = self.search.to_lowercase();

        let mut matched: Vec<&Product> = products
            .iter()
            .filter(|p| self.category.as_deref().is_none_or(|c| p.category == c))
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();

        match self.sort {
            SortOption::Default => {}
            SortOption::PriceLowToHigh => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOption::PriceHighToLow => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOption::Newest => matched.reverse(),
        }

        matched
    }
}

/// Unique non-blank categories in first-seen order, spelled as stored.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        let category = &product.category;
        if !category.trim().is_empty() && !seen.contains(category) {
            seen.push(category.clone());
        }
    }
    seen
}

/// Categories split between the toggle bar and the overflow menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBar {
    pub visible: Vec<String>,
    pub overflow: Vec<String>,
}

impl CategoryBar {
    #[must_use]
    pub fn new(mut categories: Vec<String>) -> Self {
        let overflow = if categories.len() > MAX_VISIBLE_CATEGORIES {
            categories.split_off(MAX_VISIBLE_CATEGORIES)
        } else {
            Vec::new()
        };
        Self {
            visible: categories,
            overflow,
        }
    }

    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.visible.iter().chain(&self.overflow).any(|c| c == category)
    }

    /// Keep `selected` only if it is still a known category.
    #[must_use]
    pub fn normalize(&self, selected: Option<&str>) -> Option<String> {
        selected
            .filter(|c| !c.is_empty() && self.contains(c))
            .map(str::to_owned)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use eshop_core::ProductId;

    use super::*;

    fn product(id: &str, name: &str, category: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: category.to_string(),
            manufacturer: "Acme".to_string(),
            price: Decimal::new(price, 0),
            available_items: 1,
            image_url: None,
            description: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Desk Lamp", "Furniture", 40),
            product("2", "Phone", "Electronics", 300),
            product("3", "Lamp Shade", "Furniture", 15),
            product("4", "Cable", "Electronics", 15),
        ]
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_default_keeps_server_order() {
        let products = catalog();
        let result = CatalogQuery::default().apply(&products);
        assert_eq!(ids(&result), ["1", "2", "3", "4"]);
    }

    #[test]
    fn test_category_and_search_combine() {
        let products = catalog();
        let query = CatalogQuery {
            category: Some("Furniture".to_string()),
            search: "LAMP".to_string(),
            sort: SortOption::Default,
        };
        assert_eq!(ids(&query.apply(&products)), ["1", "3"]);

        let query = CatalogQuery {
            search: "shade".to_string(),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&query.apply(&products)), ["3"]);
    }

    #[test]
    fn test_search_and_category_match_as_typed() {
        let mut products = catalog();
        products.push(product("5", "Lamp", "Furniture ", 20));

        let spaced = CatalogQuery {
            search: " ".to_string(),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&spaced.apply(&products)), ["1", "3"]);

        let padded = CatalogQuery {
            search: " lamp".to_string(),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&padded.apply(&products)), ["1"]);

        let exact = CatalogQuery {
            category: Some("Furniture".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&exact.apply(&products)), ["1", "3"]);
    }

    #[test]
    fn test_price_sorts_are_stable() {
        let products = catalog();
        let low = CatalogQuery {
            sort: SortOption::PriceLowToHigh,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&low.apply(&products)), ["3", "4", "1", "2"]);

        let high = CatalogQuery {
            sort: SortOption::PriceHighToLow,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&high.apply(&products)), ["2", "1", "3", "4"]);
    }

    #[test]
    fn test_newest_reverses_server_order() {
        let products = catalog();
        let query = CatalogQuery {
            sort: SortOption::Newest,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&query.apply(&products)), ["4", "3", "2", "1"]);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(
            SortOption::parse_lenient(Some("priceHighToLow")),
            SortOption::PriceHighToLow
        );
        assert_eq!(
            "price-low-to-high".parse::<SortOption>().unwrap(),
            SortOption::PriceLowToHigh
        );
        assert_eq!(SortOption::parse_lenient(Some("bogus")), SortOption::Default);
        assert_eq!(SortOption::parse_lenient(None), SortOption::Default);
        assert!("bogus".parse::<SortOption>().is_err());
    }

    #[test]
    fn test_categories_unique_in_first_seen_order() {
        let mut products = catalog();
        products.push(product("5", "Blank", "  ", 1));
        products.push(product("6", "Stool", "Furniture ", 1));
        assert_eq!(
            categories(&products),
            ["Furniture", "Electronics", "Furniture "]
        );
    }

    #[test]
    fn test_category_bar_overflow() {
        let names: Vec<String> = (1..=10).map(|i| format!("C{i}")).collect();
        let bar = CategoryBar::new(names);
        assert_eq!(bar.visible.len(), MAX_VISIBLE_CATEGORIES);
        assert_eq!(bar.overflow, ["C9", "C10"]);
        assert!(bar.contains("C10"));

        let small = CategoryBar::new(vec!["A".to_string()]);
        assert!(small.overflow.is_empty());
    }

    #[test]
    fn test_unknown_selected_category_means_all() {
        let bar = CategoryBar::new(vec!["Books".to_string()]);
        assert_eq!(bar.normalize(Some("Books")), Some("Books".to_string()));
        assert_eq!(bar.normalize(Some("Toys")), None);
        assert_eq!(bar.normalize(Some("")), None);
        assert_eq!(bar.normalize(Some(" Books")), None);
        assert_eq!(bar.normalize(None), None);
    }
}
