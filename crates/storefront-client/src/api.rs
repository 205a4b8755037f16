//! # Cart Backend
//!
//! The seam between the cart store and whatever serves cart data.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront API                                   │
//! │                                                                         │
//! │  fetch_cart()       GET  /users/cartData                                │
//! │                     ◄── { cart: { items: CartItem[] | null } }          │
//! │                                                                         │
//! │  update_quantity()  POST /product/updateCartQuantity                    │
//! │                     ──► { cartItemId, quantity }                        │
//! │                     ◄── ack (body ignored)                              │
//! │                                                                         │
//! │  create_order()     POST /users/createOrder                             │
//! │                     ──► { address, cart: CartItem[], total }            │
//! │                     ◄── { orderNumber: string | number }                │
//! │                                                                         │
//! │  Any non-2xx: { message } is surfaced as ClientError::Api.message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`HttpBackend`](crate::http::HttpBackend) talks to the real API;
//! [`InMemoryBackend`](crate::memory::InMemoryBackend) stands in for tests.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use storefront_core::money::{self, Money};
use storefront_core::types::{Address, CartItem};

use crate::error::ClientResult;

pub const CART_DATA_PATH: &str = "/users/cartData";
pub const UPDATE_QUANTITY_PATH: &str = "/product/updateCartQuantity";
pub const CREATE_ORDER_PATH: &str = "/users/createOrder";

/// Remote operations the cart depends on.
///
/// Implementations must be cheap to clone into spawned sync tasks, hence
/// the `Send + Sync + 'static` bound.
#[async_trait]
pub trait CartBackend: Send + Sync + 'static {
    /// Current server-side cart. A missing or null item list is an empty cart.
    async fn fetch_cart(&self) -> ClientResult<Vec<CartItem>>;

    /// Persists one item's quantity.
    async fn update_quantity(&self, cart_item_id: &str, quantity: i64) -> ClientResult<()>;

    /// Places an order and returns the server-assigned order number.
    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<String>;
}

// =============================================================================
// Wire Types
// =============================================================================

/// Body of `GET /users/cartData`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartDataResponse {
    #[serde(default)]
    pub cart: Option<CartData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartData {
    #[serde(default)]
    pub items: Option<Vec<CartItem>>,
}

impl CartDataResponse {
    pub fn into_items(self) -> Vec<CartItem> {
        self.cart.and_then(|c| c.items).unwrap_or_default()
    }
}

/// Body of `POST /product/updateCartQuantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub cart_item_id: String,
    pub quantity: i64,
}

/// Body of `POST /users/createOrder`.
///
/// `total` is the client-computed grand total in rupees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub address: Address,
    pub cart: Vec<CartItem>,
    #[serde(with = "money::rupees")]
    pub total: Money,
}

/// Body returned by `POST /users/createOrder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub order_number: String,
}

/// Error body the API sends with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_data_null_items() {
        let body: CartDataResponse = serde_json::from_value(json!({ "cart": { "items": null } })).unwrap();
        assert!(body.into_items().is_empty());

        let body: CartDataResponse = serde_json::from_value(json!({})).unwrap();
        assert!(body.into_items().is_empty());
    }

    #[test]
    fn test_cart_data_items() {
        let body: CartDataResponse = serde_json::from_value(json!({
            "cart": { "items": [{
                "_id": "c1",
                "productName": "Silk Dupatta",
                "unitPrice": 349.5,
                "quantity": 2,
                "minimumOrderQuantity": 2,
                "taxRate": 12,
                "taxType": "exclusive"
            }]}
        }))
        .unwrap();

        let items = body.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "c1");
        assert_eq!(items[0].unit_price, Money::from_paise(34_950));
        assert_eq!(items[0].minimum_order_quantity, 2);
    }

    #[test]
    fn test_update_request_shape() {
        let req = UpdateQuantityRequest {
            cart_item_id: "c1".into(),
            quantity: 4,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "cartItemId": "c1", "quantity": 4 })
        );
    }

    #[test]
    fn test_order_number_string_or_number() {
        let r: CreateOrderResponse = serde_json::from_value(json!({ "orderNumber": "ORD-77" })).unwrap();
        assert_eq!(r.order_number, "ORD-77");

        let r: CreateOrderResponse = serde_json::from_value(json!({ "orderNumber": 10452 })).unwrap();
        assert_eq!(r.order_number, "10452");
    }

    #[test]
    fn test_create_order_total_in_rupees() {
        let req = CreateOrderRequest {
            address: Address::default(),
            cart: vec![],
            total: Money::from_rupees(736),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["total"], 736);
        assert!(value["cart"].as_array().unwrap().is_empty());
        assert!(value["address"].get("fullName").is_some());
    }
}
