//! # storefront-client: Cart Sync & Checkout for the Storefront
//!
//! This crate connects the pure rules in `storefront-core` to the storefront
//! API: it holds the shopper's cart, keeps quantities in step with the server
//! and places orders.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Architecture                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  CartStore<B: CartBackend>                       │  │
//! │  │                                                                  │  │
//! │  │  Owns the Cart, applies changes optimistically, tracks the       │  │
//! │  │  latest sync sequence per item, turns outcomes into Notices      │  │
//! │  └───────────────┬──────────────────────────────┬───────────────────┘  │
//! │                  │                              │                      │
//! │                  ▼                              ▼                      │
//! │  ┌────────────────────────────┐  ┌──────────────────────────────────┐  │
//! │  │ QuantitySyncer             │  │ submit_order()                   │  │
//! │  │                            │  │                                  │  │
//! │  │ Tokio task, per-item       │  │ Address gate, empty-cart check,  │  │
//! │  │ debounce (500 ms default)  │  │ createOrder, clear on success    │  │
//! │  └──────────────┬─────────────┘  └────────────────┬─────────────────┘  │
//! │                 │                                 │                    │
//! │                 ▼                                 ▼                    │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ CartBackend                                                      │  │
//! │  │   HttpBackend      reqwest, X-Request-Id, bearer token, cookies  │  │
//! │  │   InMemoryBackend  recording + failure injection for tests       │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use storefront_client::{submit_order, CartStore, ClientConfig, HttpBackend};
//! use storefront_core::types::Address;
//!
//! # async fn run(address: Address) -> Result<(), storefront_client::ClientError> {
//! let config = ClientConfig::load(None)?;
//! let mut store = CartStore::from_config(HttpBackend::new(&config)?, &config);
//! store.load().await?;
//!
//! store.change_quantity("66f1a2", 1)?;
//! for notice in store.flush_sync().await? {
//!     println!("{notice}");
//! }
//!
//! let confirmation = submit_order(&mut store, &address).await?;
//! println!("go to {}", confirmation.redirect_path);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod store;
pub mod sync;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{CartBackend, CreateOrderRequest};
pub use checkout::{order_success_path, submit_order, OrderConfirmation};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use memory::InMemoryBackend;
pub use store::{CartStore, Notice, SyncStatus};
pub use sync::{QuantitySyncer, SyncEvent, SyncHandle};
