//! The immutable set of items a session pays for

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{CartId, Money, SelectionItem};

/// The items a checkout session was started with
///
/// A selection is fixed at session creation. Cart mutations made after a
/// session starts do not reach it; the user starts over instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    items: Vec<SelectionItem>,
}

impl Selection {
    /// Snapshot the cart as-is
    ///
    /// An empty cart produces an empty selection. That is not an error
    /// here; the session refuses to initiate payment instead.
    #[must_use]
    pub fn from_cart(items: Vec<SelectionItem>) -> Self {
        Self { items }
    }

    /// Build a single-item selection for a buy-now purchase
    ///
    /// The requested quantity must be at least one and no more than the
    /// available stock.
    pub fn from_single_item(
        item: SelectionItem,
        available: u32,
    ) -> Result<Self, ValidationError> {
        if item.quantity == 0 {
            return Err(ValidationError::QuantityZero);
        }
        if item.quantity > available {
            return Err(ValidationError::QuantityExceedsStock {
                requested: item.quantity,
                available,
            });
        }
        Ok(Self { items: vec![item] })
    }

    /// The items in the selection
    #[must_use]
    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    /// Whether the selection has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line totals
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::ZERO, |sum, item| sum.add(item.line_total()))
    }

    /// Cart rows backing the selection, for the confirmation payload
    #[must_use]
    pub fn cart_ids(&self) -> Vec<CartId> {
        self.items
            .iter()
            .filter_map(|item| item.cart_id.clone())
            .collect()
    }
}
