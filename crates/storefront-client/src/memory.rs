//! In-memory [`CartBackend`] for tests and offline demos.
//!
//! Behaves like a tiny storefront server: it keeps a cart, applies quantity
//! updates to it and numbers orders sequentially. Every call is recorded, and
//! failures or latency can be injected per operation.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use storefront_core::types::CartItem;

use crate::api::{CartBackend, CreateOrderRequest};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Default)]
struct InMemoryState {
    items: Vec<CartItem>,
    updates: Vec<(String, i64)>,
    orders: Vec<CreateOrderRequest>,
    fetch_count: usize,
    next_order: u32,
    fail_fetch: bool,
    fail_updates: bool,
    fail_orders: Option<String>,
    update_delays: VecDeque<Duration>,
}

/// In-memory cart backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose server-side cart holds `items`.
    pub fn with_items(items: Vec<CartItem>) -> Self {
        let backend = Self::default();
        backend.state().items = items;
        backend
    }

    fn state(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the server-side cart.
    pub fn set_items(&self, items: Vec<CartItem>) {
        self.state().items = items;
    }

    /// Server-side cart as it currently stands.
    pub fn items(&self) -> Vec<CartItem> {
        self.state().items.clone()
    }

    /// Makes `fetch_cart` fail with a 500.
    pub fn set_fail_fetch(&self, fail: bool) {
        self.state().fail_fetch = fail;
    }

    /// Makes `update_quantity` fail with a 500.
    pub fn set_fail_updates(&self, fail: bool) {
        self.state().fail_updates = fail;
    }

    /// Makes `create_order` fail with a 400 carrying `message`.
    pub fn set_fail_orders(&self, message: Option<&str>) {
        self.state().fail_orders = message.map(str::to_string);
    }

    /// Queues a latency for the next `update_quantity` call. Queued delays
    /// are consumed in call order.
    pub fn push_update_delay(&self, delay: Duration) {
        self.state().update_delays.push_back(delay);
    }

    /// Every quantity update received, in arrival order.
    pub fn updates(&self) -> Vec<(String, i64)> {
        self.state().updates.clone()
    }

    /// Every order received.
    pub fn orders(&self) -> Vec<CreateOrderRequest> {
        self.state().orders.clone()
    }

    /// Number of `fetch_cart` calls.
    pub fn fetch_count(&self) -> usize {
        self.state().fetch_count
    }
}

#[async_trait]
impl CartBackend for InMemoryBackend {
    async fn fetch_cart(&self) -> ClientResult<Vec<CartItem>> {
        let mut state = self.state();
        state.fetch_count += 1;

        if state.fail_fetch {
            return Err(ClientError::Api {
                status: 500,
                message: "Failed to load cart".into(),
            });
        }
        Ok(state.items.clone())
    }

    async fn update_quantity(&self, cart_item_id: &str, quantity: i64) -> ClientResult<()> {
        let delay = self.state().update_delays.pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        state.updates.push((cart_item_id.to_string(), quantity));

        if state.fail_updates {
            return Err(ClientError::Api {
                status: 500,
                message: "Failed to update quantity".into(),
            });
        }

        if let Some(item) = state.items.iter_mut().find(|i| i.id == cart_item_id) {
            item.quantity = quantity;
        }
        Ok(())
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<String> {
        let mut state = self.state();

        if let Some(message) = state.fail_orders.clone() {
            return Err(ClientError::Api { status: 400, message });
        }

        state.orders.push(request.clone());
        state.items.clear();
        state.next_order += 1;
        Ok(format!("ORD-{:05}", state.next_order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::money::Money;
    use storefront_core::types::Address;

    fn kurta() -> CartItem {
        CartItem::new("kurta", "Linen Kurta", Money::from_rupees(899), 1)
    }

    #[tokio::test]
    async fn test_update_applies_to_server_cart() {
        let backend = InMemoryBackend::with_items(vec![kurta()]);
        backend.update_quantity("kurta", 3).await.unwrap();

        assert_eq!(backend.updates(), vec![("kurta".to_string(), 3)]);
        assert_eq!(backend.fetch_cart().await.unwrap()[0].quantity, 3);
        assert_eq!(backend.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_update_is_recorded_not_applied() {
        let backend = InMemoryBackend::with_items(vec![kurta()]);
        backend.set_fail_updates(true);

        let err = backend.update_quantity("kurta", 3).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(backend.updates().len(), 1);
        assert_eq!(backend.items()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_sequential_order_numbers() {
        let backend = InMemoryBackend::new();
        let request = CreateOrderRequest {
            address: Address::default(),
            cart: vec![kurta()],
            total: Money::from_rupees(1399),
        };

        assert_eq!(backend.create_order(&request).await.unwrap(), "ORD-00001");
        assert_eq!(backend.create_order(&request).await.unwrap(), "ORD-00002");
        assert_eq!(backend.orders().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_orders() {
        let backend = InMemoryBackend::with_items(vec![kurta()]);
        backend.set_fail_orders(Some("Out of stock"));

        let request = CreateOrderRequest {
            address: Address::default(),
            cart: vec![kurta()],
            total: Money::from_rupees(1399),
        };
        let err = backend.create_order(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "API error (400): Out of stock");
        assert!(backend.orders().is_empty());
        assert_eq!(backend.items().len(), 1);
    }
}
