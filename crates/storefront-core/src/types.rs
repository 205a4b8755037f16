//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐   ┌─────────────────┐   ┌─────────────────┐  │
//! │  │      CartItem        │   │    TaxRate      │   │    TaxType      │  │
//! │  │  ──────────────────  │   │  ─────────────  │   │  ─────────────  │  │
//! │  │  id (_id)            │   │  bps (u32)      │   │  Inclusive      │  │
//! │  │  product_name        │   │  1800 = 18%     │   │  Exclusive      │  │
//! │  │  unit_price (Money)  │   └─────────────────┘   └─────────────────┘  │
//! │  │  quantity            │                                              │
//! │  │  minimum_order_qty   │   ┌─────────────────┐   ┌─────────────────┐  │
//! │  │  tax_rate, tax_type  │   │    Address      │   │  AddressField   │  │
//! │  │  main_image          │   │  ─────────────  │   │  ─────────────  │  │
//! │  └──────────────────────┘   │  full_name      │   │  input gating   │  │
//! │                             │  phone, pincode │   │  per form field │  │
//! │                             └─────────────────┘   └─────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Compatibility
//! These types deserialize directly from the storefront API's JSON
//! (`camelCase` keys, Mongo-style `_id`, prices and tax rates as plain
//! numbers). Missing optional fields fall back to the same defaults the
//! storefront UI uses.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (common GST slab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (the API's representation).
    ///
    /// Negative percentages clamp to zero.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display and the wire only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Serde adapter for percent-valued tax rates (`"taxRate": 18`).
///
/// `null` decodes as zero, matching `item.taxRate || 0` on the storefront.
pub mod percent {
    use super::TaxRate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(rate: &TaxRate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if rate.bps() % 100 == 0 {
            serializer.serialize_u32(rate.bps() / 100)
        } else {
            serializer.serialize_f64(rate.percentage())
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<TaxRate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pct = Option::<f64>::deserialize(deserializer)?;
        Ok(pct.map(TaxRate::from_percentage).unwrap_or_default())
    }
}

// =============================================================================
// Tax Type
// =============================================================================

/// Whether an item's unit price already contains tax.
///
/// ```text
/// INCLUSIVE (default)                 EXCLUSIVE
/// ───────────────────                 ─────────
/// ₹100 × 2 = ₹200                     ₹100 × 2 = ₹200
/// tax is inside the ₹200              + 18% tax  = ₹36
/// line total: ₹200                    line total: ₹236
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    /// Price includes tax; nothing is added.
    #[default]
    Inclusive,
    /// Price excludes tax; tax is added on top.
    Exclusive,
}

/// Anything other than `"exclusive"` (including `null` or an unknown label)
/// is treated as inclusive, so a malformed product can never be over-charged.
impl<'de> Deserialize<'de> for TaxType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(match label.as_deref() {
            Some(l) if l.eq_ignore_ascii_case("exclusive") => TaxType::Exclusive,
            _ => TaxType::Inclusive,
        })
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line of the shopping cart, as the storefront API returns it.
///
/// ## Invariant
/// `quantity >= minimum_order_quantity` after every mutation made through
/// [`crate::cart::Cart`]. Items decoded straight from the API are trusted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Cart line identifier (Mongo `_id`).
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Display name.
    pub product_name: String,

    /// Price per unit.
    #[serde(with = "crate::money::rupees")]
    #[ts(type = "number")]
    pub unit_price: Money,

    /// Units in the cart.
    #[ts(type = "number")]
    pub quantity: i64,

    /// Smallest quantity this product can be ordered in.
    #[serde(default = "default_minimum_order_quantity")]
    #[ts(type = "number")]
    pub minimum_order_quantity: i64,

    /// Tax rate (percent on the wire).
    #[serde(default, with = "percent")]
    #[ts(type = "number")]
    pub tax_rate: TaxRate,

    /// Whether `unit_price` already includes the tax.
    #[serde(default)]
    pub tax_type: TaxType,

    /// Product image URL from the asset store. Display-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
}

fn default_minimum_order_quantity() -> i64 {
    1
}

impl CartItem {
    /// Creates an item with no tax and a minimum order quantity of 1.
    pub fn new(id: impl Into<String>, product_name: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        CartItem {
            id: id.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
            minimum_order_quantity: default_minimum_order_quantity(),
            tax_rate: TaxRate::zero(),
            tax_type: TaxType::Inclusive,
            main_image: None,
        }
    }

    /// Sets the minimum order quantity.
    pub fn with_minimum_order_quantity(mut self, minimum: i64) -> Self {
        self.minimum_order_quantity = minimum;
        self
    }

    /// Sets the tax rate and how it applies.
    pub fn with_tax(mut self, rate: TaxRate, tax_type: TaxType) -> Self {
        self.tax_rate = rate;
        self.tax_type = tax_type;
        self
    }

    /// Sets the image URL.
    pub fn with_main_image(mut self, url: impl Into<String>) -> Self {
        self.main_image = Some(url.into());
        self
    }

    /// Unit price × quantity, before any exclusive tax.
    #[inline]
    pub fn base_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Address
// =============================================================================

/// Shipping address collected on the checkout page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub full_name: String,
    pub phone: String,
    pub full_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl Address {
    /// Returns the current value of a form field.
    pub fn field(&self, field: AddressField) -> &str {
        match field {
            AddressField::FullName => &self.full_name,
            AddressField::Phone => &self.phone,
            AddressField::FullAddress => &self.full_address,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::Pincode => &self.pincode,
        }
    }

    /// Applies a form edit if the field accepts it.
    ///
    /// Mirrors the checkout form's change handler: keystrokes that would put
    /// a letter in the phone number or a seventh digit in the pincode are
    /// dropped and the previous value is kept.
    ///
    /// ## Returns
    /// `true` if the value was applied.
    pub fn set_field(&mut self, field: AddressField, value: impl Into<String>) -> bool {
        let value = value.into();
        if !field.accepts_input(&value) {
            return false;
        }

        let slot = match field {
            AddressField::FullName => &mut self.full_name,
            AddressField::Phone => &mut self.phone,
            AddressField::FullAddress => &mut self.full_address,
            AddressField::City => &mut self.city,
            AddressField::State => &mut self.state,
            AddressField::Pincode => &mut self.pincode,
        };
        *slot = value;
        true
    }
}

/// The six checkout form fields, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    FullName,
    Phone,
    FullAddress,
    City,
    State,
    Pincode,
}

impl AddressField {
    /// All fields in the order the checkout gate checks them.
    pub const ALL: [AddressField; 6] = [
        AddressField::FullName,
        AddressField::Phone,
        AddressField::FullAddress,
        AddressField::City,
        AddressField::State,
        AddressField::Pincode,
    ];

    /// The field's JSON / form name.
    pub const fn name(&self) -> &'static str {
        match self {
            AddressField::FullName => "fullName",
            AddressField::Phone => "phone",
            AddressField::FullAddress => "fullAddress",
            AddressField::City => "city",
            AddressField::State => "state",
            AddressField::Pincode => "pincode",
        }
    }

    /// Keystroke-level gate for partially typed input.
    ///
    /// - phone: up to 10 digits
    /// - pincode: up to 6 digits
    /// - everything else: free text
    pub fn accepts_input(&self, value: &str) -> bool {
        let max_digits = match self {
            AddressField::Phone => 10,
            AddressField::Pincode => 6,
            _ => return true,
        };
        value.len() <= max_digits && value.bytes().all(|b| b.is_ascii_digit())
    }
}

impl std::fmt::Display for AddressField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(18.0).bps(), 1800);
        assert_eq!(TaxRate::from_percentage(12.5).bps(), 1250);
        assert_eq!(TaxRate::from_percentage(-3.0).bps(), 0);
        assert!((TaxRate::from_bps(825).percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_tax_type_default() {
        assert_eq!(TaxType::default(), TaxType::Inclusive);
    }

    #[test]
    fn test_cart_item_from_api_json() {
        let json = r#"{
            "_id": "66f1a2b3c4d5e6f7a8b9c0d1",
            "productName": "Handloom Cotton Saree",
            "unitPrice": 1499.5,
            "quantity": 2,
            "minimumOrderQuantity": 2,
            "taxRate": 12,
            "taxType": "exclusive",
            "mainImage": "https://storage.googleapis.com/bucket/saree.jpg"
        }"#;

        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "66f1a2b3c4d5e6f7a8b9c0d1");
        assert_eq!(item.unit_price, Money::from_paise(149_950));
        assert_eq!(item.minimum_order_quantity, 2);
        assert_eq!(item.tax_rate, TaxRate::from_bps(1200));
        assert_eq!(item.tax_type, TaxType::Exclusive);
        assert!(item.main_image.is_some());
    }

    #[test]
    fn test_cart_item_defaults_when_fields_missing() {
        let json = r#"{
            "_id": "a1",
            "productName": "Brass Diya",
            "unitPrice": 250,
            "quantity": 1,
            "taxRate": null,
            "taxType": null
        }"#;

        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.minimum_order_quantity, 1);
        assert!(item.tax_rate.is_zero());
        assert_eq!(item.tax_type, TaxType::Inclusive);
        assert_eq!(item.main_image, None);
    }

    #[test]
    fn test_unknown_tax_type_is_inclusive() {
        let t: TaxType = serde_json::from_str(r#""gst""#).unwrap();
        assert_eq!(t, TaxType::Inclusive);
        let t: TaxType = serde_json::from_str(r#""Exclusive""#).unwrap();
        assert_eq!(t, TaxType::Exclusive);
    }

    #[test]
    fn test_cart_item_serializes_in_api_shape() {
        let item = CartItem::new("a1", "Brass Diya", Money::from_rupees(250), 3)
            .with_tax(TaxRate::from_bps(1800), TaxType::Exclusive);
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["_id"], "a1");
        assert_eq!(value["unitPrice"], 250);
        assert_eq!(value["taxRate"], 18);
        assert_eq!(value["taxType"], "exclusive");
        assert!(value.get("mainImage").is_none());
    }

    #[test]
    fn test_address_field_input_gate() {
        assert!(AddressField::Phone.accepts_input(""));
        assert!(AddressField::Phone.accepts_input("98765"));
        assert!(AddressField::Phone.accepts_input("9876543210"));
        assert!(!AddressField::Phone.accepts_input("98765432101"));
        assert!(!AddressField::Phone.accepts_input("98765a"));

        assert!(AddressField::Pincode.accepts_input("560001"));
        assert!(!AddressField::Pincode.accepts_input("5600011"));

        assert!(AddressField::City.accepts_input("Bengaluru 2"));
    }

    #[test]
    fn test_address_set_field_keeps_previous_value_on_reject() {
        let mut address = Address::default();
        assert!(address.set_field(AddressField::Phone, "98765"));
        assert!(!address.set_field(AddressField::Phone, "98765x"));
        assert_eq!(address.phone, "98765");

        assert!(address.set_field(AddressField::City, "Jaipur"));
        assert_eq!(address.field(AddressField::City), "Jaipur");
    }

    #[test]
    fn test_address_json_keys() {
        let address = Address {
            full_name: "Asha Rao".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&address).unwrap();
        assert_eq!(value["fullName"], "Asha Rao");
        assert!(value.get("fullAddress").is_some());
    }
}
