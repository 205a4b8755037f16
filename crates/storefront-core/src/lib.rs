//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate holds the storefront's reproducible business rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │        Cart page ──► Checkout page ──► Order success            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              storefront-client (CartStore, checkout)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │   cart    │  │ validation│  │   │
//! │  │   │ CartItem  │  │ item/order│  │   Cart    │  │  phone    │  │   │
//! │  │   │ Address   │  │  totals   │  │ invariants│  │  pincode  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire/domain types (CartItem, Address, TaxRate, TaxType)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Item totals, order totals, shipping policy
//! - [`cart`] - Cart with quantity invariants
//! - [`validation`] - Checkout address gate
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//! use storefront_core::pricing::compute_order_totals;
//! use storefront_core::types::{CartItem, TaxRate, TaxType};
//!
//! let items = vec![
//!     CartItem::new("a1", "Kurta", Money::from_rupees(100), 2)
//!         .with_tax(TaxRate::from_bps(1800), TaxType::Exclusive),
//! ];
//!
//! let totals = compute_order_totals(&items);
//! assert_eq!(totals.subtotal, Money::from_rupees(236));
//! assert_eq!(totals.shipping, Money::from_rupees(500));
//! assert_eq!(totals.total, Money::from_rupees(736));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{compute_item_total, compute_order_totals, OrderTotals};
pub use types::*;
pub use validation::{
    check_address, validate_address, validate_cart_item, validate_phone, validate_pincode, AddressCheck,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct items allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in cart.
///
/// ## Business Reason
/// Catches fat-finger input (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
