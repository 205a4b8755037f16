//! # Pricing Engine
//!
//! Line totals, order totals and the shipping policy.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Pricing                                    │
//! │                                                                         │
//! │  CartItem ──► compute_item_total                                        │
//! │               ├── inclusive: unit_price × qty                           │
//! │               └── exclusive: unit_price × qty + tax                     │
//! │                        │                                                │
//! │                        ▼ Σ over cart                                    │
//! │                    subtotal                                             │
//! │                        │                                                │
//! │          subtotal > ₹5000 ? shipping ₹0 : shipping ₹500                 │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                 total = subtotal + shipping                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure: identical input always yields identical output.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CartItem, TaxType};

/// Subtotal that must be *exceeded* for free shipping.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_rupees(5000);

/// Shipping charged at or below the threshold.
pub const FLAT_SHIPPING_FEE: Money = Money::from_rupees(500);

/// Tax added on top of an item's base total.
///
/// Zero for inclusive items: their tax is already inside the unit price.
pub fn item_tax(item: &CartItem) -> Money {
    match item.tax_type {
        TaxType::Exclusive => item.base_total().calculate_tax(item.tax_rate),
        TaxType::Inclusive => Money::zero(),
    }
}

/// Computes what a single cart line costs.
///
/// ## Example
/// ```rust
/// use storefront_core::money::Money;
/// use storefront_core::pricing::compute_item_total;
/// use storefront_core::types::{CartItem, TaxRate, TaxType};
///
/// let item = CartItem::new("a1", "Kurta", Money::from_rupees(100), 2)
///     .with_tax(TaxRate::from_bps(1800), TaxType::Exclusive);
/// assert_eq!(compute_item_total(&item), Money::from_rupees(236));
/// ```
pub fn compute_item_total(item: &CartItem) -> Money {
    item.base_total() + item_tax(item)
}

/// Computes order-level totals for a set of cart lines.
///
/// An empty slice is not an error: it prices to ₹0 + ₹500 shipping.
pub fn compute_order_totals(items: &[CartItem]) -> OrderTotals {
    let subtotal: Money = items.iter().map(compute_item_total).sum();
    let shipping = shipping_for(subtotal);

    OrderTotals {
        subtotal,
        shipping,
        total: subtotal + shipping,
    }
}

/// Shipping fee for a given subtotal. The threshold comparison is strict.
pub fn shipping_for(subtotal: Money) -> Money {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Money::zero()
    } else {
        FLAT_SHIPPING_FEE
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Subtotal, shipping and grand total for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    #[serde(with = "crate::money::rupees")]
    #[ts(type = "number")]
    pub subtotal: Money,
    #[serde(with = "crate::money::rupees")]
    #[ts(type = "number")]
    pub shipping: Money,
    #[serde(with = "crate::money::rupees")]
    #[ts(type = "number")]
    pub total: Money,
}

impl OrderTotals {
    /// True when the order ships free.
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }

    /// How much more the customer must add to unlock free shipping.
    ///
    /// `None` once shipping is already free. At exactly the threshold this
    /// is `Some(₹0.00)`: the subtotal still has to go *past* ₹5000.
    pub fn amount_to_free_shipping(&self) -> Option<Money> {
        if self.has_free_shipping() {
            None
        } else {
            Some(FREE_SHIPPING_THRESHOLD - self.subtotal)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRate;

    fn item(id: &str, rupees: i64, qty: i64) -> CartItem {
        CartItem::new(id, format!("Product {}", id), Money::from_rupees(rupees), qty)
    }

    #[test]
    fn test_inclusive_ignores_tax_rate() {
        for bps in [0, 500, 1200, 1800, 2800] {
            let line = item("a", 100, 2).with_tax(TaxRate::from_bps(bps), TaxType::Inclusive);
            assert_eq!(compute_item_total(&line), Money::from_rupees(200));
            assert!(item_tax(&line).is_zero());
        }
    }

    #[test]
    fn test_exclusive_adds_tax() {
        let line = item("a", 100, 2).with_tax(TaxRate::from_bps(1800), TaxType::Exclusive);
        assert_eq!(compute_item_total(&line), Money::from_paise(23_600));
        assert_eq!(item_tax(&line), Money::from_rupees(36));
    }

    #[test]
    fn test_exclusive_with_zero_rate() {
        let line = item("a", 100, 2).with_tax(TaxRate::zero(), TaxType::Exclusive);
        assert_eq!(compute_item_total(&line), Money::from_rupees(200));
    }

    #[test]
    fn test_empty_cart_totals() {
        let totals = compute_order_totals(&[]);
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.shipping, Money::from_rupees(500));
        assert_eq!(totals.total, Money::from_rupees(500));
    }

    #[test]
    fn test_shipping_boundary_is_strict() {
        let totals = compute_order_totals(&[item("a", 2500, 2)]);
        assert_eq!(totals.subtotal, Money::from_rupees(5000));
        assert_eq!(totals.shipping, Money::from_rupees(500));
        assert_eq!(totals.total, Money::from_rupees(5500));
        assert_eq!(totals.amount_to_free_shipping(), Some(Money::zero()));

        // One paisa over the line ships free
        let just_over = CartItem::new("b", "Just over", Money::from_paise(500_001), 1);
        let totals = compute_order_totals(&[just_over]);
        assert!(totals.has_free_shipping());
        assert_eq!(totals.total, Money::from_paise(500_001));
        assert_eq!(totals.amount_to_free_shipping(), None);
    }

    #[test]
    fn test_mixed_cart() {
        let items = vec![
            item("a", 100, 2).with_tax(TaxRate::from_bps(1800), TaxType::Exclusive), // 236
            item("b", 1000, 1).with_tax(TaxRate::from_bps(1200), TaxType::Inclusive), // 1000
        ];
        let totals = compute_order_totals(&items);
        assert_eq!(totals.subtotal, Money::from_rupees(1236));
        assert_eq!(totals.total, Money::from_rupees(1736));
        assert_eq!(totals.amount_to_free_shipping(), Some(Money::from_rupees(3764)));
    }

    #[test]
    fn test_totals_are_deterministic() {
        let items = vec![item("a", 799, 3), item("b", 1299, 1)];
        assert_eq!(compute_order_totals(&items), compute_order_totals(&items));
    }

    #[test]
    fn test_totals_wire_shape() {
        let totals = compute_order_totals(&[item("a", 100, 1)]);
        let value = serde_json::to_value(totals).unwrap();
        assert_eq!(value["subtotal"], 100);
        assert_eq!(value["shipping"], 500);
        assert_eq!(value["total"], 600);
    }
}
