//! # Cart Store
//!
//! The cart the shopper sees, kept in step with the server.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Optimistic Update                                │
//! │                                                                         │
//! │  change_quantity("kurta", +1)                                           │
//! │     │                                                                   │
//! │     ├── below minimum? ──► Err("Minimum order quantity is N")           │
//! │     │                       (cart untouched, nothing sent)              │
//! │     │                                                                   │
//! │     ├── Cart updated immediately (UI re-renders)                        │
//! │     ├── syncer.schedule() ──► seq 7 remembered as latest for "kurta"    │
//! │     └── status(kurta) = Pending                                         │
//! │                                                                         │
//! │  later: SyncEvent { seq }                                               │
//! │     ├── seq != latest  ──► ignored (superseded)                         │
//! │     ├── Synced         ──► status = Synced, Notice::QuantitySaved       │
//! │     └── Failed         ──► status = Failed, Notice::SyncFailed          │
//! │                           (local quantity kept, no rollback)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use storefront_core::cart::Cart;
use storefront_core::pricing::OrderTotals;
use storefront_core::types::CartItem;
use storefront_core::validation::validate_cart_item;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::CartBackend;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::sync::{QuantitySyncer, SyncEvent, SyncHandle};

/// Remote state of one item's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Server has the quantity shown.
    #[default]
    Synced,
    /// A change is waiting out the debounce window or is in flight.
    Pending,
    /// The latest change was rejected; the shown quantity is local only.
    Failed,
}

/// Non-blocking message for the shopper (a toast, in the web front end).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    #[serde(rename_all = "camelCase")]
    QuantitySaved { item_id: String, quantity: i64 },
    #[serde(rename_all = "camelCase")]
    SyncFailed {
        item_id: String,
        quantity: i64,
        message: String,
    },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::QuantitySaved { .. } => write!(f, "Quantity updated"),
            Notice::SyncFailed { message, .. } => {
                write!(f, "Failed to update quantity: {}", message)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ItemSync {
    latest_seq: u64,
    status: SyncStatus,
}

/// Cart state plus its link to the backend.
///
/// Must be created inside a tokio runtime: construction spawns the
/// [`QuantitySyncer`].
pub struct CartStore<B: CartBackend> {
    backend: Arc<B>,
    cart: Cart,
    syncer: SyncHandle,
    events: mpsc::UnboundedReceiver<SyncEvent>,
    sync: HashMap<String, ItemSync>,
}

impl<B: CartBackend> CartStore<B> {
    /// Creates an empty store. Call [`load`](Self::load) to fetch the cart.
    pub fn new(backend: B, debounce: Duration) -> Self {
        let backend = Arc::new(backend);
        let (syncer, events) = QuantitySyncer::start(Arc::clone(&backend), debounce);

        Self {
            backend,
            cart: Cart::new(),
            syncer,
            events,
            sync: HashMap::new(),
        }
    }

    /// Creates an empty store using the configured debounce window.
    pub fn from_config(backend: B, config: &ClientConfig) -> Self {
        Self::new(backend, config.debounce())
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replaces local state with the server's cart.
    pub async fn load(&mut self) -> ClientResult<()> {
        let items = self.backend.fetch_cart().await?;
        check_items(&items)?;
        info!(count = items.len(), "Cart loaded");

        for item_id in self.sync.keys() {
            self.syncer.cancel(item_id)?;
        }
        self.sync.clear();
        self.cart.replace_items(items);
        Ok(())
    }

    /// Re-fetches the cart without losing changes still on their way out.
    ///
    /// Items with a pending change keep their local quantity. Failed markers
    /// are cleared: the server's value is the one shown again.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let mut items = self.backend.fetch_cart().await?;
        check_items(&items)?;

        for item in items.iter_mut() {
            let pending = self
                .sync
                .get(&item.id)
                .is_some_and(|s| s.status == SyncStatus::Pending);

            if pending {
                if let Some(local) = self.cart.get(&item.id) {
                    debug!(item_id = %item.id, local = local.quantity, server = item.quantity, "Keeping in-flight quantity");
                    item.quantity = local.quantity;
                }
            }
        }

        self.sync.retain(|id, s| {
            s.status == SyncStatus::Pending && items.iter().any(|i| &i.id == id)
        });
        debug!(count = items.len(), pending = self.sync.len(), "Cart refreshed");

        self.cart.replace_items(items);
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn get(&self, item_id: &str) -> Option<&CartItem> {
        self.cart.get(item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn totals(&self) -> OrderTotals {
        self.cart.totals()
    }

    /// Remote state of an item's quantity. Unknown items report `Synced`.
    pub fn sync_status(&self, item_id: &str) -> SyncStatus {
        self.sync.get(item_id).map(|s| s.status).unwrap_or_default()
    }

    /// True while any change is waiting or in flight.
    pub fn has_pending_sync(&self) -> bool {
        self.sync.values().any(|s| s.status == SyncStatus::Pending)
    }

    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds an item (merging with an existing line) and schedules the
    /// resulting quantity for that line.
    pub fn add_item(&mut self, item: CartItem) -> ClientResult<i64> {
        let item_id = item.id.clone();
        let quantity = self.cart.add_item(item)?;
        self.schedule_sync(&item_id, quantity)?;
        Ok(quantity)
    }

    /// Changes an item's quantity by `delta` and schedules the remote update.
    ///
    /// A change that would fall below the item's minimum is rejected and the
    /// cart is left as it was.
    pub fn change_quantity(&mut self, item_id: &str, delta: i64) -> ClientResult<i64> {
        let quantity = self.cart.change_quantity(item_id, delta)?;
        self.schedule_sync(item_id, quantity)?;
        Ok(quantity)
    }

    /// Sets an item's quantity and schedules the remote update.
    pub fn set_quantity(&mut self, item_id: &str, quantity: i64) -> ClientResult<i64> {
        let current = self.cart.get(item_id).map(|i| i.quantity);
        let quantity = self.cart.set_quantity(item_id, quantity)?;

        if current != Some(quantity) {
            self.schedule_sync(item_id, quantity)?;
        }
        Ok(quantity)
    }

    /// Removes an item locally and drops its unsent change.
    pub fn remove_item(&mut self, item_id: &str) -> ClientResult<CartItem> {
        let removed = self.cart.remove_item(item_id)?;
        if self.sync.remove(item_id).is_some() {
            self.syncer.cancel(item_id)?;
        }
        debug!(item_id = %item_id, "Item removed");
        Ok(removed)
    }

    /// Empties the cart locally and drops every unsent change.
    pub fn clear(&mut self) -> ClientResult<()> {
        for item_id in self.sync.keys() {
            self.syncer.cancel(item_id)?;
        }
        self.sync.clear();
        self.cart.clear();
        Ok(())
    }

    fn schedule_sync(&mut self, item_id: &str, quantity: i64) -> ClientResult<()> {
        let seq = self.syncer.schedule(item_id, quantity)?;
        self.sync.insert(
            item_id.to_string(),
            ItemSync {
                latest_seq: seq,
                status: SyncStatus::Pending,
            },
        );
        Ok(())
    }

    // =========================================================================
    // Sync Outcomes
    // =========================================================================

    /// Applies one sync outcome. Returns the notice to show, if any.
    ///
    /// Outcomes for removed items or superseded changes are ignored.
    pub fn apply_event(&mut self, event: SyncEvent) -> Option<Notice> {
        let state = match self.sync.get_mut(event.item_id()) {
            Some(state) => state,
            None => {
                debug!(item_id = %event.item_id(), seq = event.seq(), "Ignoring outcome for untracked item");
                return None;
            }
        };

        if event.seq() != state.latest_seq {
            debug!(
                item_id = %event.item_id(),
                seq = event.seq(),
                latest = state.latest_seq,
                "Ignoring superseded sync outcome"
            );
            return None;
        }

        match event {
            SyncEvent::Synced { item_id, quantity, .. } => {
                state.status = SyncStatus::Synced;
                Some(Notice::QuantitySaved { item_id, quantity })
            }
            SyncEvent::Failed {
                item_id,
                quantity,
                message,
                ..
            } => {
                state.status = SyncStatus::Failed;
                warn!(item_id = %item_id, quantity, %message, "Quantity not saved; keeping local value");
                Some(Notice::SyncFailed {
                    item_id,
                    quantity,
                    message,
                })
            }
        }
    }

    /// Applies every outcome that has already arrived, without waiting.
    pub fn poll_sync_events(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            notices.extend(self.apply_event(event));
        }
        notices
    }

    /// Waits for the next outcome that produces a notice.
    ///
    /// Returns `None` at once when nothing is pending.
    pub async fn next_sync_event(&mut self) -> Option<Notice> {
        while self.has_pending_sync() {
            let event = self.events.recv().await?;
            if let Some(notice) = self.apply_event(event) {
                return Some(notice);
            }
        }
        None
    }

    /// Sends pending changes now and waits for all of them to settle.
    pub async fn flush_sync(&mut self) -> ClientResult<Vec<Notice>> {
        self.syncer.flush()?;

        let mut notices = Vec::new();
        while let Some(notice) = self.next_sync_event().await {
            notices.push(notice);
        }
        Ok(notices)
    }
}

/// Rejects a fetched cart holding a line the pricing rules cannot total.
fn check_items(items: &[CartItem]) -> ClientResult<()> {
    for item in items {
        validate_cart_item(item).map_err(|e| {
            warn!(item_id = %item.id, error = %e, "Server returned an invalid cart item");
            ClientError::Decode(format!("cart item {}: {}", item.id, e))
        })?;
    }
    Ok(())
}

impl<B: CartBackend> Drop for CartStore<B> {
    fn drop(&mut self) {
        // Handle drop would flush too; this just makes the intent explicit.
        let _ = self.syncer.shutdown();
    }
}

impl<B: CartBackend> std::fmt::Debug for CartStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.cart.len())
            .field("pending", &self.has_pending_sync())
            .finish_non_exhaustive()
    }
}
