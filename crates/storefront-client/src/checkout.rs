//! # Checkout
//!
//! Turns a validated address and the current cart into an order.
//!
//! ```text
//! submit_order(store, address)
//!    │
//!    ├── validate_address ──✗──► Err(Validation)        nothing sent
//!    ├── cart empty?      ──✗──► Err(EmptyCart)         nothing sent
//!    │
//!    ├── POST /users/createOrder { address, cart, total }
//!    │        │
//!    │        ├── ✗ ──► Err(..)   cart kept, safe to retry
//!    │        └── ✓ ──► cart cleared
//!    │
//!    └── OrderConfirmation { orderNumber, redirectPath, totals, placedAt }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use storefront_core::pricing::OrderTotals;
use storefront_core::types::Address;
use storefront_core::validation::validate_address;
use storefront_core::CoreError;
use tracing::{info, warn};

use crate::api::{CartBackend, CreateOrderRequest};
use crate::error::ClientResult;
use crate::store::CartStore;

/// What the shopper gets back after a successful order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_number: String,
    /// Where the front end navigates next.
    pub redirect_path: String,
    pub totals: OrderTotals,
    pub placed_at: DateTime<Utc>,
}

/// Path of the order success page for `order_number`.
pub fn order_success_path(order_number: &str) -> String {
    format!("/order-success/{}", order_number)
}

/// Places an order for everything in `store`.
///
/// The total sent is computed locally from the cart snapshot, so it always
/// matches what the shopper saw.
pub async fn submit_order<B: CartBackend>(
    store: &mut CartStore<B>,
    address: &Address,
) -> ClientResult<OrderConfirmation> {
    validate_address(address)?;

    if store.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let totals = store.totals();
    let request = CreateOrderRequest {
        address: address.clone(),
        cart: store.items().to_vec(),
        total: totals.total,
    };

    info!(items = request.cart.len(), total = %totals.total, "Placing order");

    let order_number = match store.backend().create_order(&request).await {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "Order not placed; cart kept");
            return Err(e);
        }
    };

    store.clear()?;
    info!(order_number = %order_number, "Order placed");

    Ok(OrderConfirmation {
        redirect_path: order_success_path(&order_number),
        order_number,
        totals,
        placed_at: Utc::now(),
    })
}
