//! Order line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// A product line in an order draft.
///
/// `name`, `category`, `description` and `price` are copied from the product
/// when the order is started and do not follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    /// Snapshot `product` with the requested quantity.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            description: product.description.clone(),
            quantity,
            price: product.price,
        }
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_line_total() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Kettle".to_string(),
            category: "Electronics".to_string(),
            manufacturer: "Acme".to_string(),
            price: Decimal::new(7495, 1),
            available_items: 10,
            image_url: None,
            description: Some("1.5L".to_string()),
        };

        let item = OrderItem::from_product(&product, 2);
        assert_eq!(item.product_id, product.id);
        assert_eq!(item.name, "Kettle");
        assert_eq!(item.line_total(), Decimal::new(1499, 0));
    }
}
