//! # Quantity Syncer
//!
//! Debounces cart quantity changes and pushes the final value of each burst
//! to the backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quantity Syncer                                  │
//! │                                                                         │
//! │  CartStore                                                              │
//! │     │ schedule(item, qty) ──► seq 1, 2, 3 ...                           │
//! │     ▼                                                                   │
//! │  ┌─────────────────────────────┐                                        │
//! │  │ Pending (one per item)      │   every schedule() for the same item   │
//! │  │                             │   overwrites quantity + seq and        │
//! │  │  kurta: qty 4, seq 3, t+500 │   pushes the deadline out again        │
//! │  │  diya:  qty 2, seq 5, t+320 │                                        │
//! │  └──────────────┬──────────────┘                                        │
//! │                 │ deadline reached (or flush)                           │
//! │                 ▼                                                       │
//! │  spawn ──► backend.update_quantity(item, qty)                           │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  SyncEvent::Synced { seq } | SyncEvent::Failed { seq, message }         │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  CartStore drops any event whose seq is not the item's latest          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests run as detached tasks, but never two for the same item at once:
//! a change that comes due while its item is still in flight waits for that
//! request to finish. The server therefore ends on the last quantity sent,
//! and the sequence number tells the store which outcome is the current one.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::api::CartBackend;
use crate::error::{ClientError, ClientResult};

/// Default quiet period before a quantity change is sent.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

// =============================================================================
// Sync Events
// =============================================================================

/// Outcome of one remote quantity update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The backend accepted the quantity.
    Synced { item_id: String, quantity: i64, seq: u64 },

    /// The backend rejected the quantity or could not be reached.
    Failed {
        item_id: String,
        quantity: i64,
        seq: u64,
        message: String,
    },
}

impl SyncEvent {
    pub fn item_id(&self) -> &str {
        match self {
            SyncEvent::Synced { item_id, .. } | SyncEvent::Failed { item_id, .. } => item_id,
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            SyncEvent::Synced { seq, .. } | SyncEvent::Failed { seq, .. } => *seq,
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Commands for the syncer task.
#[derive(Debug)]
enum SyncCommand {
    Schedule { item_id: String, quantity: i64, seq: u64 },
    Cancel { item_id: String },
    Flush,
    Shutdown,
}

/// Handle for feeding the syncer. Cheap to clone.
///
/// Dropping every handle shuts the syncer down after flushing what is pending.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    cmd_tx: mpsc::UnboundedSender<SyncCommand>,
    next_seq: Arc<AtomicU64>,
}

impl SyncHandle {
    /// Schedules `quantity` for `item_id` and returns the change's sequence
    /// number. Sequence numbers start at 1 and only grow.
    pub fn schedule(&self, item_id: &str, quantity: i64) -> ClientResult<u64> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.send(SyncCommand::Schedule {
            item_id: item_id.to_string(),
            quantity,
            seq,
        })?;
        Ok(seq)
    }

    /// Drops a not-yet-sent change. A request already in flight still runs.
    pub fn cancel(&self, item_id: &str) -> ClientResult<()> {
        self.send(SyncCommand::Cancel {
            item_id: item_id.to_string(),
        })
    }

    /// Sends every pending change now instead of waiting for its deadline.
    pub fn flush(&self) -> ClientResult<()> {
        self.send(SyncCommand::Flush)
    }

    /// Flushes and stops the syncer.
    pub fn shutdown(&self) -> ClientResult<()> {
        self.send(SyncCommand::Shutdown)
    }

    fn send(&self, cmd: SyncCommand) -> ClientResult<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| ClientError::ChannelClosed("Quantity syncer channel closed".into()))
    }
}

// =============================================================================
// Syncer
// =============================================================================

#[derive(Debug, Clone)]
struct PendingUpdate {
    quantity: i64,
    seq: u64,
    deadline: Instant,
}

/// Background task that owns the pending map.
///
/// At most one request per item is in flight. A change that comes due while
/// its item still has a request running is held and sent, with whatever
/// quantity is latest by then, once that request finishes. Requests for one
/// item therefore reach the backend in the order they were issued.
pub struct QuantitySyncer<B: CartBackend> {
    backend: Arc<B>,
    debounce: Duration,
    pending: HashMap<String, PendingUpdate>,
    in_flight: HashSet<String>,
    events_tx: mpsc::UnboundedSender<SyncEvent>,
    done_tx: mpsc::UnboundedSender<String>,
}

impl<B: CartBackend> QuantitySyncer<B> {
    /// Spawns the syncer on the current tokio runtime.
    ///
    /// Returns the command handle and the receiver for outcomes.
    pub fn start(
        backend: Arc<B>,
        debounce: Duration,
    ) -> (SyncHandle, mpsc::UnboundedReceiver<SyncEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let syncer = QuantitySyncer {
            backend,
            debounce,
            pending: HashMap::new(),
            in_flight: HashSet::new(),
            events_tx,
            done_tx,
        };
        tokio::spawn(syncer.run(cmd_rx, done_rx));

        let handle = SyncHandle {
            cmd_tx,
            next_seq: Arc::new(AtomicU64::new(0)),
        };
        (handle, events_rx)
    }

    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<SyncCommand>,
        mut done_rx: mpsc::UnboundedReceiver<String>,
    ) {
        info!(debounce_ms = self.debounce.as_millis() as u64, "Quantity syncer started");
        let mut draining = false;

        loop {
            if draining && self.pending.is_empty() {
                break;
            }

            // Held updates wait for their item's request, not for a timer
            let next_deadline = self
                .pending
                .iter()
                .filter(|(id, _)| !self.in_flight.contains(*id))
                .map(|(_, p)| p.deadline)
                .min();

            tokio::select! {
                cmd = cmd_rx.recv(), if !draining => match cmd {
                    Some(SyncCommand::Schedule { item_id, quantity, seq }) => {
                        self.schedule(item_id, quantity, seq);
                    }
                    Some(SyncCommand::Cancel { item_id }) => {
                        if self.pending.remove(&item_id).is_some() {
                            debug!(item_id = %item_id, "Cancelled pending quantity sync");
                        }
                    }
                    Some(SyncCommand::Flush) => self.send_all(),
                    Some(SyncCommand::Shutdown) | None => {
                        info!("Quantity syncer shutting down");
                        self.send_all();
                        draining = true;
                    }
                },
                Some(item_id) = done_rx.recv() => {
                    self.in_flight.remove(&item_id);
                }
                _ = sleep_until(next_deadline.unwrap_or_else(Instant::now)), if next_deadline.is_some() => {
                    self.send_due();
                }
            }
        }
    }

    fn schedule(&mut self, item_id: String, quantity: i64, seq: u64) {
        let deadline = Instant::now() + self.debounce;

        match self.pending.get_mut(&item_id) {
            Some(existing) => {
                debug!(
                    item_id = %item_id,
                    quantity,
                    seq,
                    superseded_seq = existing.seq,
                    "Coalesced quantity change"
                );
                existing.quantity = quantity;
                existing.seq = seq;
                existing.deadline = deadline;
            }
            None => {
                debug!(item_id = %item_id, quantity, seq, "Scheduled quantity sync");
                self.pending.insert(item_id, PendingUpdate { quantity, seq, deadline });
            }
        }
    }

    fn send_due(&mut self) {
        let now = Instant::now();
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(id, p)| p.deadline <= now && !self.in_flight.contains(*id))
            .map(|(id, _)| id.clone())
            .collect();

        for item_id in due {
            if let Some(update) = self.pending.remove(&item_id) {
                self.send(item_id, update);
            }
        }
    }

    /// Sends everything now; updates held behind a running request become
    /// due immediately and go out when it finishes.
    fn send_all(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        debug!(count = self.pending.len(), "Flushing pending quantity changes");

        let now = Instant::now();
        for update in self.pending.values_mut() {
            update.deadline = now;
        }
        self.send_due();
    }

    fn send(&mut self, item_id: String, update: PendingUpdate) {
        let backend = Arc::clone(&self.backend);
        let events_tx = self.events_tx.clone();
        let done_tx = self.done_tx.clone();
        self.in_flight.insert(item_id.clone());

        tokio::spawn(async move {
            let PendingUpdate { quantity, seq, .. } = update;

            let result = backend.update_quantity(&item_id, quantity).await;
            let event = match result {
                Ok(()) => {
                    debug!(item_id = %item_id, quantity, seq, "Quantity synced");
                    SyncEvent::Synced {
                        item_id: item_id.clone(),
                        quantity,
                        seq,
                    }
                }
                Err(e) => {
                    warn!(item_id = %item_id, quantity, seq, error = %e, "Quantity sync failed");
                    SyncEvent::Failed {
                        item_id: item_id.clone(),
                        quantity,
                        seq,
                        message: user_message(&e),
                    }
                }
            };

            // Receivers gone means the store or the syncer was dropped
            let _ = events_tx.send(event);
            let _ = done_tx.send(item_id);
        });
    }
}

/// Message shown to the shopper for a failed request.
pub(crate) fn user_message(err: &ClientError) -> String {
    match err {
        ClientError::Api { message, .. } => message.clone(),
        ClientError::Network(_) => "Network error. Please check your connection.".into(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use storefront_core::money::Money;
    use storefront_core::types::CartItem;

    fn backend() -> Arc<InMemoryBackend> {
        Arc::new(InMemoryBackend::with_items(vec![
            CartItem::new("kurta", "Linen Kurta", Money::from_rupees(899), 1),
            CartItem::new("diya", "Brass Diya", Money::from_rupees(250), 1),
        ]))
    }

    const WINDOW: Duration = Duration::from_millis(DEFAULT_DEBOUNCE_MS);

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_final_quantity() {
        let backend = backend();
        let (handle, mut events) = QuantitySyncer::start(Arc::clone(&backend), WINDOW);

        handle.schedule("kurta", 2).unwrap();
        handle.schedule("kurta", 3).unwrap();
        let last = handle.schedule("kurta", 4).unwrap();
        assert_eq!(last, 3);

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            SyncEvent::Synced {
                item_id: "kurta".into(),
                quantity: 4,
                seq: 3
            }
        );
        assert_eq!(backend.updates(), vec![("kurta".to_string(), 4)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_change_restarts_the_window() {
        let backend = backend();
        let (handle, mut events) = QuantitySyncer::start(Arc::clone(&backend), WINDOW);

        handle.schedule("kurta", 2).unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.schedule("kurta", 3).unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        // 800 ms since the first change but only 400 since the last
        assert!(backend.updates().is_empty());

        let event = events.recv().await.unwrap();
        assert_eq!(event.seq(), 2);
        assert_eq!(backend.updates(), vec![("kurta".to_string(), 3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_debounce_independently() {
        let backend = backend();
        let (handle, mut events) = QuantitySyncer::start(Arc::clone(&backend), WINDOW);

        handle.schedule("kurta", 2).unwrap();
        handle.schedule("diya", 5).unwrap();

        let a = events.recv().await.unwrap();
        let b = events.recv().await.unwrap();
        let mut ids = vec![a.item_id().to_string(), b.item_id().to_string()];
        ids.sort();
        assert_eq!(ids, vec!["diya", "kurta"]);
        assert_eq!(backend.updates().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_send_separately() {
        let backend = backend();
        let (handle, mut events) = QuantitySyncer::start(Arc::clone(&backend), WINDOW);

        handle.schedule("kurta", 2).unwrap();
        events.recv().await.unwrap();
        handle.schedule("kurta", 3).unwrap();
        events.recv().await.unwrap();

        assert_eq!(
            backend.updates(),
            vec![("kurta".to_string(), 2), ("kurta".to_string(), 3)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reports_message() {
        let backend = backend();
        backend.set_fail_updates(true);
        let (handle, mut events) = QuantitySyncer::start(Arc::clone(&backend), WINDOW);

        handle.schedule("kurta", 2).unwrap();
        match events.recv().await.unwrap() {
            SyncEvent::Failed { item_id, quantity, message, .. } => {
                assert_eq!(item_id, "kurta");
                assert_eq!(quantity, 2);
                assert_eq!(message, "Failed to update quantity");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_change() {
        let backend = backend();
        let (handle, _events) = QuantitySyncer::start(Arc::clone(&backend), WINDOW);

        handle.schedule("kurta", 2).unwrap();
        handle.cancel("kurta").unwrap();
        tokio::time::sleep(WINDOW * 2).await;

        assert!(backend.updates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_sends_immediately() {
        let backend = backend();
        let (handle, mut events) = QuantitySyncer::start(Arc::clone(&backend), Duration::from_secs(60));

        handle.schedule("kurta", 7).unwrap();
        handle.flush().unwrap();

        let start = Instant::now();
        events.recv().await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(backend.updates(), vec![("kurta".to_string(), 7)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_waits_for_running_request() {
        let backend = backend();
        backend.push_update_delay(Duration::from_secs(2));
        let (handle, mut events) = QuantitySyncer::start(Arc::clone(&backend), WINDOW);

        handle.schedule("diya", 3).unwrap();
        tokio::time::sleep(WINDOW + Duration::from_millis(100)).await;

        // First request is still sleeping in the backend
        handle.schedule("diya", 4).unwrap();
        tokio::time::sleep(WINDOW + Duration::from_millis(100)).await;
        assert!(backend.updates().is_empty());

        assert_eq!(events.recv().await.unwrap().seq(), 1);
        assert_eq!(events.recv().await.unwrap().seq(), 2);
        assert_eq!(backend.updates(), vec![("diya".to_string(), 3), ("diya".to_string(), 4)]);
        assert_eq!(backend.items()[1].quantity, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_held_change_takes_latest_quantity() {
        let backend = backend();
        backend.push_update_delay(Duration::from_secs(2));
        let (handle, mut events) = QuantitySyncer::start(Arc::clone(&backend), WINDOW);

        handle.schedule("kurta", 2).unwrap();
        tokio::time::sleep(WINDOW + Duration::from_millis(100)).await;

        handle.schedule("kurta", 3).unwrap();
        handle.schedule("kurta", 5).unwrap();
        handle.flush().unwrap();

        assert_eq!(events.recv().await.unwrap().seq(), 1);
        let held = events.recv().await.unwrap();
        assert_eq!(
            held,
            SyncEvent::Synced {
                item_id: "kurta".into(),
                quantity: 5,
                seq: 3
            }
        );
        assert_eq!(backend.updates(), vec![("kurta".to_string(), 2), ("kurta".to_string(), 5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_flushes() {
        let backend = backend();
        let (handle, mut events) = QuantitySyncer::start(Arc::clone(&backend), Duration::from_secs(60));

        handle.schedule("diya", 3).unwrap();
        drop(handle);

        assert_eq!(events.recv().await.unwrap().seq(), 1);
        assert_eq!(backend.updates(), vec![("diya".to_string(), 3)]);
    }
}
