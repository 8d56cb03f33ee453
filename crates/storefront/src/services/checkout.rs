//! Order wizard state machine.
//!
//! A draft moves linearly through [`WizardStep`]s. It is created from a
//! product detail page already past the items step, kept in the session
//! between requests, and turned into one order request per item when placed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eshop_core::{Address, AddressId, OrderItem, UserId};

use crate::api::OrderRequest;

/// Allowed quantity per order line.
pub const QUANTITY_RANGE: std::ops::RangeInclusive<u32> = 1..=99;

/// Wizard errors. `Display` is the notice shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Quantity must be between 1 and 99")]
    InvalidQuantity,

    #[error("Please select an address!")]
    NoAddressSelected,

    #[error("Order is already at the final step")]
    AlreadyFinal,

    #[error("Please confirm the order details before placing it")]
    NotReadyToPlace,
}

/// Wizard position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WizardStep {
    #[default]
    Items,
    SelectAddress,
    Confirm,
}

impl WizardStep {
    pub const ALL: [Self; 3] = [Self::Items, Self::SelectAddress, Self::Confirm];

    /// Stepper label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Items => "Items",
            Self::SelectAddress => "Select Address",
            Self::Confirm => "Confirm Order",
        }
    }

    /// Zero-based position.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Items => 0,
            Self::SelectAddress => 1,
            Self::Confirm => 2,
        }
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Items => Some(Self::SelectAddress),
            Self::SelectAddress => Some(Self::Confirm),
            Self::Confirm => None,
        }
    }

    const fn previous(self) -> Option<Self> {
        match self {
            Self::Items | Self::SelectAddress => None,
            Self::Confirm => Some(Self::SelectAddress),
        }
    }
}

/// Result of stepping back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackOutcome {
    /// The wizard is left; navigate to `to`.
    Leave { to: String },
    /// The draft moved to this step.
    Moved(WizardStep),
}

/// In-progress order, stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<OrderItem>,
    pub step: WizardStep,
    pub selected_address: Option<AddressId>,
}

impl OrderDraft {
    /// Start a draft for one item, positioned at address selection.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::InvalidQuantity` outside 1 to 99.
    pub fn start(item: OrderItem) -> Result<Self, WizardError> {
        if !QUANTITY_RANGE.contains(&item.quantity) {
            return Err(WizardError::InvalidQuantity);
        }
        Ok(Self {
            items: vec![item],
            step: WizardStep::SelectAddress,
            selected_address: None,
        })
    }

    /// Advance one step.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::NoAddressSelected` when leaving address selection
    /// without an address, and `WizardError::AlreadyFinal` at the last step.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == WizardStep::SelectAddress && self.selected_address.is_none() {
            return Err(WizardError::NoAddressSelected);
        }
        let next = self.step.next().ok_or(WizardError::AlreadyFinal)?;
        self.step = next;
        Ok(next)
    }

    /// Go back one step, or leave the wizard from the first visible step.
    pub fn back(&mut self) -> BackOutcome {
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                BackOutcome::Moved(previous)
            }
            None => BackOutcome::Leave {
                to: self.items.first().map_or_else(
                    || "/products".to_string(),
                    |item| format!("/products/{}", item.product_id),
                ),
            },
        }
    }

    pub fn select_address(&mut self, id: AddressId) {
        self.selected_address = Some(id);
    }

    /// Clear the selection if it is `id`. Returns whether it was cleared.
    pub fn clear_address_if(&mut self, id: &AddressId) -> bool {
        if self.selected_address.as_ref() == Some(id) {
            self.selected_address = None;
            true
        } else {
            false
        }
    }

    /// Drop a selection that is not among `addresses`.
    pub fn retain_existing(&mut self, addresses: &[Address]) {
        if let Some(selected) = &self.selected_address
            && !addresses.iter().any(|a| &a.id == selected)
        {
            self.selected_address = None;
        }
    }

    /// The selected address, looked up in `addresses`.
    #[must_use]
    pub fn selected<'a>(&self, addresses: &'a [Address]) -> Option<&'a Address> {
        let selected = self.selected_address.as_ref()?;
        addresses.iter().find(|a| &a.id == selected)
    }

    /// Sum of `price * quantity` over all items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Address to ship to, if the draft may be placed.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::NotReadyToPlace` before the confirm step and
    /// `WizardError::NoAddressSelected` without an address.
    pub fn ready_to_place(&self) -> Result<&AddressId, WizardError> {
        if self.step != WizardStep::Confirm {
            return Err(WizardError::NotReadyToPlace);
        }
        self.selected_address
            .as_ref()
            .ok_or(WizardError::NoAddressSelected)
    }

    /// One API request per item.
    ///
    /// # Errors
    ///
    /// Same as [`OrderDraft::ready_to_place`].
    pub fn order_requests(&self, user: Option<&UserId>) -> Result<Vec<OrderRequest>, WizardError> {
        let address = self.ready_to_place()?;
        Ok(self
            .items
            .iter()
            .map(|item| OrderRequest {
                quantity: item.quantity,
                user: user.cloned(),
                product: item.product_id.clone(),
                address: address.clone(),
            })
            .collect())
    }

    /// Drop the first `count` items after their orders were accepted.
    ///
    /// Returns whether anything is left to place.
    pub fn mark_placed(&mut self, count: usize) -> bool {
        self.items.drain(..count.min(self.items.len()));
        !self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eshop_core::ProductId;

    use super::*;

    fn item(quantity: u32) -> OrderItem {
        OrderItem {
            product_id: ProductId::new("p1"),
            name: "Kettle".to_string(),
            category: "Electronics".to_string(),
            description: None,
            quantity,
            price: Decimal::new(2505, 1),
        }
    }

    fn address(id: &str) -> Address {
        Address {
            id: AddressId::new(id),
            name: "Home".to_string(),
            contact_number: "9876543210".to_string(),
            street: "1 Main St".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            landmark: None,
            zipcode: "411001".to_string(),
        }
    }

    #[test]
    fn test_start_validates_quantity() {
        assert_eq!(OrderDraft::start(item(0)), Err(WizardError::InvalidQuantity));
        assert_eq!(OrderDraft::start(item(100)), Err(WizardError::InvalidQuantity));

        let draft = OrderDraft::start(item(99)).unwrap();
        assert_eq!(draft.step, WizardStep::SelectAddress);
        assert!(draft.selected_address.is_none());
    }

    #[test]
    fn test_next_requires_address() {
        let mut draft = OrderDraft::start(item(1)).unwrap();
        assert_eq!(draft.next(), Err(WizardError::NoAddressSelected));
        assert_eq!(draft.step, WizardStep::SelectAddress);
        assert_eq!(
            WizardError::NoAddressSelected.to_string(),
            "Please select an address!"
        );

        draft.select_address(AddressId::new("a1"));
        assert_eq!(draft.next(), Ok(WizardStep::Confirm));
        assert_eq!(draft.next(), Err(WizardError::AlreadyFinal));
    }

    #[test]
    fn test_back_leaves_to_first_product() {
        let mut draft = OrderDraft::start(item(1)).unwrap();
        draft.select_address(AddressId::new("a1"));
        draft.next().unwrap();

        assert_eq!(draft.back(), BackOutcome::Moved(WizardStep::SelectAddress));
        assert_eq!(
            draft.back(),
            BackOutcome::Leave {
                to: "/products/p1".to_string()
            }
        );

        draft.items.clear();
        assert_eq!(
            draft.back(),
            BackOutcome::Leave {
                to: "/products".to_string()
            }
        );
    }

    #[test]
    fn test_total_sums_lines() {
        let mut draft = OrderDraft::start(item(2)).unwrap();
        draft.items.push(OrderItem {
            quantity: 1,
            price: Decimal::new(100, 0),
            ..item(1)
        });
        assert_eq!(draft.total(), Decimal::new(601, 0));
    }

    #[test]
    fn test_selection_follows_server_addresses() {
        let mut draft = OrderDraft::start(item(1)).unwrap();
        draft.select_address(AddressId::new("a2"));

        let addresses = vec![address("a1"), address("a2")];
        assert_eq!(draft.selected(&addresses).unwrap().id.as_str(), "a2");

        draft.retain_existing(addresses.get(..1).unwrap());
        assert!(draft.selected_address.is_none());

        draft.select_address(AddressId::new("a1"));
        assert!(!draft.clear_address_if(&AddressId::new("a2")));
        assert!(draft.clear_address_if(&AddressId::new("a1")));
        assert!(draft.selected_address.is_none());
    }

    #[test]
    fn test_order_requests_only_at_confirm() {
        let mut draft = OrderDraft::start(item(3)).unwrap();
        assert_eq!(
            draft.order_requests(None).unwrap_err(),
            WizardError::NotReadyToPlace
        );

        draft.select_address(AddressId::new("a1"));
        draft.next().unwrap();

        let user = UserId::new("u1");
        let requests = draft.order_requests(Some(&user)).unwrap();
        assert_eq!(requests.len(), 1);
        let request = requests.first().unwrap();
        assert_eq!(request.quantity, 3);
        assert_eq!(request.address.as_str(), "a1");
        assert_eq!(request.user.as_ref(), Some(&user));
    }

    #[test]
    fn test_mark_placed_keeps_only_unsent_items() {
        let mut draft = OrderDraft::start(item(1)).unwrap();
        draft.items.push(OrderItem {
            product_id: ProductId::new("p2"),
            ..item(2)
        });
        draft.select_address(AddressId::new("a1"));
        draft.next().unwrap();

        assert!(draft.mark_placed(1));
        let requests = draft.order_requests(None).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests.first().unwrap().product.as_str(), "p2");
        assert_eq!(draft.step, WizardStep::Confirm);

        assert!(!draft.mark_placed(5));
        assert!(draft.items.is_empty());
    }
}
