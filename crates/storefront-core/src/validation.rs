//! # Validation Module
//!
//! Checkout form validation and cart input checks.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Keystroke gate (AddressField::accepts_input)                 │
//! │  └── phone/pincode only ever hold digits, never too many               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Submit gate (THIS MODULE: validate_address)                  │
//! │  ├── all six fields present, in fixed order                            │
//! │  ├── phone format                                                       │
//! │  └── pincode format                                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend (out of scope)                                       │
//! │  └── persistence constraints, final pricing                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_phone, validate_pincode};
//!
//! assert!(validate_phone("8123456789"));
//! assert!(!validate_phone("9999999999"));
//! assert!(!validate_pincode("012345"));
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{Address, AddressField, CartItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an Indian mobile number.
///
/// ## Rules
/// - Exactly 10 ASCII digits
/// - First digit is 6, 7, 8 or 9
/// - Not the same digit ten times (`9999999999` is a placeholder, not a phone)
pub fn validate_phone(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    if bytes.len() != 10 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }

    if !matches!(bytes[0], b'6'..=b'9') {
        return false;
    }

    bytes.iter().any(|&b| b != bytes[0])
}

/// Validates a postal index number.
///
/// ## Rules
/// - Exactly 6 ASCII digits
/// - First digit is 1-9 (no PIN starts with 0)
pub fn validate_pincode(pincode: &str) -> bool {
    let bytes = pincode.as_bytes();
    bytes.len() == 6 && bytes.iter().all(u8::is_ascii_digit) && bytes[0] != b'0'
}

// =============================================================================
// Address Gate
// =============================================================================

/// Validates a shipping address before order submission.
///
/// ## Order of Checks
/// ```text
/// fullName ─► phone ─► fullAddress ─► city ─► state ─► pincode   (non-empty)
///      │
///      ▼
/// phone format ─► pincode format
///      │
///      ▼
/// Ok(()) or the FIRST failure, never a list
/// ```
///
/// ## Example
/// ```rust
/// use storefront_core::types::Address;
/// use storefront_core::validation::validate_address;
///
/// let address = Address {
///     full_name: "Asha Rao".into(),
///     phone: "8123456789".into(),
///     full_address: "12 MG Road".into(),
///     city: "Bengaluru".into(),
///     state: "Karnataka".into(),
///     pincode: "560001".into(),
/// };
/// assert!(validate_address(&address).is_ok());
/// ```
pub fn validate_address(address: &Address) -> ValidationResult<()> {
    if let Some(missing) = AddressField::ALL
        .into_iter()
        .find(|field| address.field(*field).is_empty())
    {
        return Err(ValidationError::Required {
            field: missing.name().to_string(),
        });
    }

    if !validate_phone(&address.phone) {
        return Err(ValidationError::InvalidPhone);
    }

    if !validate_pincode(&address.pincode) {
        return Err(ValidationError::InvalidPincode);
    }

    Ok(())
}

/// Outcome of the address gate in `{ valid, firstError }` form, for UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddressCheck {
    pub valid: bool,
    pub first_error: Option<String>,
}

impl From<ValidationResult<()>> for AddressCheck {
    fn from(result: ValidationResult<()>) -> Self {
        match result {
            Ok(()) => AddressCheck {
                valid: true,
                first_error: None,
            },
            Err(e) => AddressCheck {
                valid: false,
                first_error: Some(e.to_string()),
            },
        }
    }
}

/// Runs [`validate_address`] and returns the UI-shaped result.
pub fn check_address(address: &Address) -> AddressCheck {
    validate_address(address).into()
}

// =============================================================================
// Cart Item Checks
// =============================================================================

/// Highest tax rate accepted from the API (100%).
const MAX_TAX_BPS: u32 = 10_000;

/// Sanity checks for a cart line received from the API.
///
/// ## Rules
/// - `quantity` and `minimumOrderQuantity` at least 1
/// - `unitPrice` not negative (zero is allowed for free samples)
/// - `taxRate` between 0 and 100 percent
///
/// The 999 ceiling is not checked here: it guards user input, and the
/// server's cart is taken as it is.
pub fn validate_cart_item(item: &CartItem) -> ValidationResult<()> {
    if item.quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if item.minimum_order_quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "minimumOrderQuantity".to_string(),
        });
    }

    if item.unit_price.is_negative() {
        return Err(ValidationError::Negative {
            field: "unitPrice".to_string(),
        });
    }

    if item.tax_rate.bps() > MAX_TAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{TaxRate, TaxType};

    fn valid_address() -> Address {
        Address {
            full_name: "Asha Rao".into(),
            phone: "8123456789".into(),
            full_address: "12 MG Road".into(),
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            pincode: "560001".into(),
        }
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("8123456789"));
        assert!(validate_phone("6000000001"));

        // All-identical digits pass the shape rule but are rejected
        assert!(!validate_phone("9999999999"));
        assert!(!validate_phone("6666666666"));

        assert!(!validate_phone("5123456789")); // leading digit
        assert!(!validate_phone("812345678")); // 9 digits
        assert!(!validate_phone("81234567890")); // 11 digits
        assert!(!validate_phone("81234 6789"));
        assert!(!validate_phone(""));
        // Non-ASCII digits never count
        assert!(!validate_phone("８１２３４５６７８９"));
    }

    #[test]
    fn test_validate_pincode() {
        assert!(validate_pincode("560001"));
        assert!(validate_pincode("110011"));

        assert!(!validate_pincode("012345"));
        assert!(!validate_pincode("56001"));
        assert!(!validate_pincode("5600011"));
        assert!(!validate_pincode("56000a"));
    }

    #[test]
    fn test_validate_address_ok() {
        assert!(validate_address(&valid_address()).is_ok());
    }

    #[test]
    fn test_validate_address_reports_first_missing_field_in_order() {
        let mut address = valid_address();
        address.city.clear();
        address.phone.clear();

        // phone comes before city in the fixed order
        assert_eq!(
            validate_address(&address),
            Err(ValidationError::Required {
                field: "phone".to_string()
            })
        );
    }

    #[test]
    fn test_validate_address_presence_before_format() {
        let mut address = valid_address();
        address.phone = "123".into(); // bad format
        address.pincode.clear(); // missing

        assert_eq!(
            validate_address(&address),
            Err(ValidationError::Required {
                field: "pincode".to_string()
            })
        );
    }

    #[test]
    fn test_validate_address_phone_before_pincode() {
        let mut address = valid_address();
        address.phone = "9999999999".into();
        address.pincode = "012345".into();
        assert_eq!(validate_address(&address), Err(ValidationError::InvalidPhone));

        address.phone = "8123456789".into();
        assert_eq!(validate_address(&address), Err(ValidationError::InvalidPincode));
    }

    #[test]
    fn test_check_address_shape() {
        let check = check_address(&valid_address());
        assert!(check.valid);
        assert_eq!(check.first_error, None);

        let check = check_address(&Address::default());
        assert!(!check.valid);
        assert_eq!(check.first_error.as_deref(), Some("fullName is required"));
    }

    #[test]
    fn test_validate_cart_item() {
        let item = CartItem::new("a1", "Kurta", Money::from_rupees(899), 2);
        assert!(validate_cart_item(&item).is_ok());

        // Free sample
        let free = CartItem::new("s1", "Sample", Money::zero(), 1);
        assert!(validate_cart_item(&free).is_ok());

        let mut bad = item.clone();
        bad.quantity = 0;
        assert_eq!(
            validate_cart_item(&bad),
            Err(ValidationError::MustBePositive {
                field: "quantity".to_string()
            })
        );

        let bad = item.clone().with_minimum_order_quantity(0);
        assert!(matches!(validate_cart_item(&bad), Err(ValidationError::MustBePositive { .. })));

        let mut bad = item.clone();
        bad.unit_price = Money::from_paise(-100);
        assert_eq!(
            validate_cart_item(&bad).unwrap_err().to_string(),
            "unitPrice must not be negative"
        );

        let bad = item.with_tax(TaxRate::from_bps(12_000), TaxType::Exclusive);
        assert!(matches!(
            validate_cart_item(&bad),
            Err(ValidationError::OutOfRange { max: 100, .. })
        ));
    }
}
