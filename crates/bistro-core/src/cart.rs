//! # Cart
//!
//! The customer's cart between menu browsing and checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI Action               Cart Method              Cart Change           │
//! │  ─────────               ───────────              ───────────           │
//! │                                                                         │
//! │  "Add to cart" ────────► add_item() ────────────► push / qty += n      │
//! │                                                                         │
//! │  +/- stepper ──────────► update_quantity() ─────► qty = n (0 removes)  │
//! │                                                                         │
//! │  Trash icon ───────────► remove_item() ─────────► items.remove(i)      │
//! │                                                                         │
//! │  Order placed ─────────► clear() ───────────────► items.clear()        │
//! │                                                                         │
//! │  Order summary ────────► totals(&rates) ────────► calculate_order_totals│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::totals::calculate_order_totals;
use crate::types::{LineItem, MenuItem, OrderTotals, RateConfig};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// An item in the cart.
///
/// Name and price are frozen when the dish is added, so a menu edit while
/// the customer is browsing does not silently change their order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartItem {
    /// Snapshots a menu item at the given quantity.
    pub fn from_menu_item(item: &MenuItem, quantity: u32) -> Self {
        CartItem {
            menu_item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.price,
            quantity,
        }
    }

    /// The calculator's view of this item.
    pub fn line_item(&self) -> LineItem {
        LineItem::new(self.unit_price, self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `menu_item_id` (adding again increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` distinct items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a dish or increases its quantity if already present.
    pub fn add_item(&mut self, menu_item: &MenuItem, quantity: u32) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if !menu_item.is_available {
            return Err(CoreError::ItemUnavailable {
                name: menu_item.name.clone(),
            });
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.menu_item_id == menu_item.id)
        {
            let new_qty = item.quantity.saturating_add(quantity);
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::from_menu_item(menu_item, quantity));
        Ok(())
    }

    /// Sets the quantity of an item. Zero removes it.
    pub fn update_quantity(&mut self, menu_item_id: &str, quantity: u32) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(menu_item_id);
        }

        validate_quantity(quantity)?;

        match self
            .items
            .iter_mut()
            .find(|i| i.menu_item_id == menu_item_id)
        {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::NotInCart(menu_item_id.to_string())),
        }
    }

    /// Removes an item by menu item ID.
    pub fn remove_item(&mut self, menu_item_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.menu_item_id != menu_item_id);

        if self.items.len() == initial_len {
            Err(CoreError::NotInCart(menu_item_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line items in cart order.
    pub fn line_items(&self) -> Vec<LineItem> {
        self.items.iter().map(CartItem::line_item).collect()
    }

    /// Order summary for the checkout page.
    pub fn totals(&self, rates: &RateConfig) -> OrderTotals {
        calculate_order_totals(&self.line_items(), rates)
    }
}
