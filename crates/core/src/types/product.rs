//! Catalog products.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product as stored by the REST API.
///
/// The API sometimes names the identifier `_id`; both spellings are accepted.
/// Prices and stock are read from either JSON numbers or strings, and prices
/// are written back as numbers. Missing or `null` text fields become empty so
/// one sloppy record cannot break a whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub manufacturer: String,
    #[serde(
        default,
        deserialize_with = "lenient_price",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient_count")]
    pub available_items: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Product {
    /// Length after which card descriptions are cut.
    pub const CARD_DESCRIPTION_CHARS: usize = 100;

    /// Length after which the detail view collapses the description.
    pub const COLLAPSE_DESCRIPTION_CHARS: usize = 150;

    /// Price in the store currency.
    #[must_use]
    pub fn price(&self) -> Price {
        Price::store(self.price)
    }

    /// Description text, empty when absent.
    #[must_use]
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Description cut to `limit` characters with a trailing `...`.
    ///
    /// Descriptions at or under the limit are returned unchanged.
    #[must_use]
    pub fn short_description(&self, limit: usize) -> String {
        truncate_chars(self.description_text(), limit)
    }

    /// Whether the detail view should offer "Read More".
    #[must_use]
    pub fn has_long_description(&self) -> bool {
        self.description_text().chars().count() > Self::COLLAPSE_DESCRIPTION_CHARS
    }

    /// Image URL, or `fallback` when the product has none.
    #[must_use]
    pub fn image_url_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.image_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(fallback)
    }
}

/// Cut `text` to `limit` characters, appending `...` when anything was removed.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", text.get(..byte_idx).unwrap_or(text)),
        None => text.to_owned(),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Decimal>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Number(serde_json::Number),
    String(String),
}

/// Stock as a non-negative count; anything unreadable counts as zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Count::String(s)) => s.trim().parse().ok(),
        None => None,
    };
    Ok(count.unwrap_or_default())
}

/// Body for creating or updating a product.
///
/// Updates repeat the product id inside the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    pub category: String,
    pub manufacturer: String,
    pub available_items: u32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
