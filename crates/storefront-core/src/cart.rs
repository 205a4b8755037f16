//! # Cart
//!
//! The in-memory shopping cart and its mutation rules.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Operations                                    │
//! │                                                                         │
//! │  UI Action            Cart Method              Rule                     │
//! │  ─────────            ───────────              ────                     │
//! │  Add to cart ───────► add_item()         ───► merge by id, ≥ minimum    │
//! │  Click + / − ───────► change_quantity()  ───► ≥ minimum, ≤ 999          │
//! │  Type a number ─────► set_quantity()     ───► ≥ minimum, ≤ 999          │
//! │  Click trash ───────► remove_item()                                     │
//! │  Order placed ──────► clear()                                           │
//! │  Cart fetched ──────► replace_items()    ───► API data trusted as-is    │
//! │                                                                         │
//! │  A rejected mutation leaves the cart exactly as it was.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::pricing::{compute_order_totals, OrderTotals};
use crate::types::CartItem;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id` (adding the same id increases quantity)
/// - Every mutation keeps `minimum_order_quantity <= quantity <= 999`
/// - At most 100 distinct items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from items fetched from the API.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Cart { items }
    }

    /// Items in display order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Looks up an item by id.
    pub fn get(&self, item_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Adds an item, merging quantities if the id is already present.
    ///
    /// ## Returns
    /// The item's quantity after the add.
    pub fn add_item(&mut self, item: CartItem) -> CoreResult<i64> {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            let new_qty = existing.quantity.saturating_add(item.quantity);
            check_floor(existing, new_qty)?;
            check_ceiling(new_qty)?;
            existing.quantity = new_qty;
            return Ok(new_qty);
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        check_floor(&item, item.quantity)?;
        check_ceiling(item.quantity)?;

        let qty = item.quantity;
        self.items.push(item);
        Ok(qty)
    }

    /// Changes an item's quantity by `delta` (the + / − buttons).
    ///
    /// ## Returns
    /// - `Ok(new_quantity)` when applied
    /// - `Err(BelowMinimumQuantity)` when the result would be under the
    ///   item's minimum; nothing is changed
    pub fn change_quantity(&mut self, item_id: &str, delta: i64) -> CoreResult<i64> {
        let current = self
            .get(item_id)
            .map(|i| i.quantity)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        // Saturating: an overflowing delta lands on a bound and is rejected there
        self.set_quantity(item_id, current.saturating_add(delta))
    }

    /// Sets an item's quantity to an absolute value.
    pub fn set_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<i64> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        check_floor(item, quantity)?;
        check_ceiling(quantity)?;

        item.quantity = quantity;
        Ok(quantity)
    }

    /// Removes an item by id and returns it.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<CartItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        Ok(self.items.remove(index))
    }

    /// Replaces the whole cart (fresh data from the API).
    pub fn replace_items(&mut self, items: Vec<CartItem>) {
        self.items = items;
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Subtotal, shipping and total for the current contents.
    pub fn totals(&self) -> OrderTotals {
        compute_order_totals(&self.items)
    }
}

fn check_floor(item: &CartItem, quantity: i64) -> CoreResult<()> {
    if quantity < item.minimum_order_quantity {
        return Err(CoreError::BelowMinimumQuantity {
            item_id: item.id.clone(),
            minimum: item.minimum_order_quantity,
            requested: quantity,
        });
    }
    Ok(())
}

fn check_ceiling(quantity: i64) -> CoreResult<()> {
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn saree(min: i64, qty: i64) -> CartItem {
        CartItem::new("saree", "Cotton Saree", Money::from_rupees(1499), qty)
            .with_minimum_order_quantity(min)
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item(saree(1, 2)).unwrap(), 2);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.totals().subtotal, Money::from_rupees(2998));
    }

    #[test]
    fn test_add_same_item_merges() {
        let mut cart = Cart::new();
        cart.add_item(saree(1, 2)).unwrap();
        assert_eq!(cart.add_item(saree(1, 3)).unwrap(), 5);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_item_below_minimum_rejected() {
        let mut cart = Cart::new();
        let err = cart.add_item(saree(5, 2)).unwrap_err();
        assert!(matches!(err, CoreError::BelowMinimumQuantity { minimum: 5, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_below_minimum_rejected() {
        let mut cart = Cart::from_items(vec![saree(5, 5)]);
        let before = cart.clone();

        let err = cart.change_quantity("saree", -1).unwrap_err();
        assert_eq!(err.to_string(), "Minimum order quantity is 5");
        assert_eq!(cart, before);
    }

    #[test]
    fn test_change_quantity_applies() {
        let mut cart = Cart::from_items(vec![saree(5, 5)]);
        assert_eq!(cart.change_quantity("saree", 3).unwrap(), 8);
        assert_eq!(cart.change_quantity("saree", -3).unwrap(), 5);
        assert_eq!(cart.get("saree").unwrap().quantity, 5);
    }

    #[test]
    fn test_set_quantity_ceiling() {
        let mut cart = Cart::from_items(vec![saree(1, 1)]);
        let err = cart.set_quantity("saree", 1000).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
        assert_eq!(cart.get("saree").unwrap().quantity, 1);
    }

    #[test]
    fn test_huge_delta_rejected_without_overflow() {
        let mut cart = Cart::from_items(vec![saree(1, 3)]);

        let err = cart.change_quantity("saree", i64::MAX).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: i64::MAX, .. }));

        let err = cart.change_quantity("saree", i64::MIN).unwrap_err();
        assert!(matches!(err, CoreError::BelowMinimumQuantity { requested: i64::MIN, .. }));

        let err = cart.add_item(saree(1, i64::MAX)).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));

        assert_eq!(cart.get("saree").unwrap().quantity, 3);
    }

    #[test]
    fn test_unknown_item() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.change_quantity("nope", 1),
            Err(CoreError::ItemNotFound(_))
        ));
        assert!(cart.remove_item("nope").is_err());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::from_items(vec![
            saree(1, 1),
            CartItem::new("diya", "Brass Diya", Money::from_rupees(250), 4),
        ]);

        let removed = cart.remove_item("saree").unwrap();
        assert_eq!(removed.id, "saree");
        assert_eq!(cart.len(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals().total, Money::from_rupees(500));
    }

    #[test]
    fn test_cart_capacity() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(CartItem::new(format!("p{}", i), "Item", Money::from_rupees(1), 1))
                .unwrap();
        }
        let err = cart
            .add_item(CartItem::new("overflow", "Item", Money::from_rupees(1), 1))
            .unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }
}
