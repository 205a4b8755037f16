//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations (cart invariants)     │
//! │  └── ValidationError  - Checkout form / input validation failures      │
//! │                                                                         │
//! │  storefront-client errors (separate crate)                             │
//! │  └── ClientError      - Network, API and configuration failures        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → UI notification     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item ID, field name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is raised *before* any mutation or network call, so the cart
/// is untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Quantity change would drop an item below its minimum order quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: "Cotton Saree" qty 5, minimum 5
    ///      │
    ///      ▼  user clicks "−"
    /// change_quantity(id, -1) → 4 < 5
    ///      │
    ///      ▼
    /// BelowMinimumQuantity { minimum: 5, .. }
    ///      │
    ///      ▼
    /// UI toast: "Minimum order quantity is 5"
    /// ```
    #[error("Minimum order quantity is {minimum}")]
    BelowMinimumQuantity {
        item_id: String,
        minimum: i64,
        requested: i64,
    },

    /// Item is not in the cart.
    #[error("Item not in cart: {0}")]
    ItemNotFound(String),

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These surface on the checkout form and are recovered locally: the user
/// fixes the field and submits again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Phone number failed the format rule.
    #[error("Invalid phone number. Must be 10 digits and start with 6–9.")]
    InvalidPhone,

    /// Pincode failed the format rule.
    #[error("Invalid pincode. Must be a 6-digit number and not start with 0.")]
    InvalidPincode,

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Amount must not be below zero.
    #[error("{field} must not be negative")]
    Negative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
