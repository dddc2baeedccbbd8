//! Correlation Registry - bridges an outbound request to its inbound reply.
//!
//! Flow:
//! 1. The orchestrator calls `subscribe()` with the request's tracking id
//! 2. It sends the request downstream
//! 3. The bus adapter receives the reply and calls `deliver()`
//! 4. The orchestrator awaits the handle or gives up after the wait bound
//!
//! Every exit path removes the registration: delivery, timeout, explicit
//! cancel, or the handle being dropped mid-wait.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::Tracked;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::CorrelationError;

struct PendingResponse<R> {
    /// Distinguishes successive registrations of the same tracking id
    seq: u64,
    sender: oneshot::Sender<R>,
    created_at: Instant,
}

/// Counters for the registry
#[derive(Debug, Default)]
pub struct CorrelationStats {
    pub registered: AtomicU64,
    pub delivered: AtomicU64,
    pub timed_out: AtomicU64,
    /// Waiters that went away before a reply or timeout
    pub cancelled: AtomicU64,
    /// Replies nobody was waiting for
    pub unmatched: AtomicU64,
}

type PendingMap<R> = DashMap<String, PendingResponse<R>>;

/// Maps tracking ids to the single waiter expecting that reply.
pub struct CorrelationRegistry<R> {
    pending: Arc<PendingMap<R>>,
    next_seq: AtomicU64,
    stats: Arc<CorrelationStats>,
}

/// Receiving side of one registration.
///
/// Dropping it before a reply arrives removes the registration.
pub struct ResponseHandle<R> {
    tracking_id: String,
    seq: u64,
    receiver: oneshot::Receiver<R>,
    pending: Arc<PendingMap<R>>,
    stats: Arc<CorrelationStats>,
    settled: AtomicBool,
}

impl<R> ResponseHandle<R> {
    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    fn settle(&self) {
        self.settled.store(true, Ordering::Relaxed);
    }
}

impl<R> Drop for ResponseHandle<R> {
    fn drop(&mut self) {
        let seq = self.seq;
        let removed = self
            .pending
            .remove_if(&self.tracking_id, |_, entry| entry.seq == seq)
            .is_some();
        if removed && !self.settled.load(Ordering::Relaxed) {
            self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(tracking_id = %self.tracking_id, "Waiter dropped before reply");
        }
    }
}

impl<R: Tracked + Send + 'static> CorrelationRegistry<R> {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            next_seq: AtomicU64::new(0),
            stats: Arc::new(CorrelationStats::default()),
        }
    }

    /// Register interest in the reply for `tracking_id`.
    ///
    /// Fails if another waiter already holds that tracking id.
    pub fn subscribe(
        &self,
        tracking_id: impl Into<String>,
    ) -> Result<ResponseHandle<R>, CorrelationError> {
        let tracking_id = tracking_id.into();
        let (tx, rx) = oneshot::channel();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        match self.pending.entry(tracking_id.clone()) {
            Entry::Occupied(_) => {
                return Err(CorrelationError::AlreadyPending { tracking_id });
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingResponse {
                    seq,
                    sender: tx,
                    created_at: Instant::now(),
                });
            }
        }
        self.stats.registered.fetch_add(1, Ordering::Relaxed);
        debug!(tracking_id = %tracking_id, "Registered pending reply");

        Ok(ResponseHandle {
            tracking_id,
            seq,
            receiver: rx,
            pending: Arc::clone(&self.pending),
            stats: Arc::clone(&self.stats),
            settled: AtomicBool::new(false),
        })
    }

    /// Wait up to `wait` for the reply.
    ///
    /// On timeout the registration is removed, so a later reply with the
    /// same tracking id is treated as unmatched.
    pub async fn await_response(&self, mut handle: ResponseHandle<R>, wait: Duration) -> Option<R> {
        match timeout(wait, &mut handle.receiver).await {
            Ok(Ok(response)) => {
                handle.settle();
                Some(response)
            }
            Ok(Err(_)) => {
                handle.settle();
                None
            }
            Err(_) => {
                let seq = handle.seq;
                self.pending
                    .remove_if(&handle.tracking_id, |_, entry| entry.seq == seq);
                handle.settle();
                // A reply may have landed between the deadline and the removal
                if let Ok(response) = handle.receiver.try_recv() {
                    return Some(response);
                }
                self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                warn!(
                    tracking_id = %handle.tracking_id,
                    wait_ms = wait.as_millis() as u64,
                    "Timed out waiting for reply"
                );
                None
            }
        }
    }

    /// Hand `response` to whoever is waiting on its tracking id.
    ///
    /// Returns false when nobody is waiting; the response is discarded.
    pub fn deliver(&self, response: R) -> bool {
        let tracking_id = response.tracking_id().to_string();
        let Some((_, pending)) = self.pending.remove(&tracking_id) else {
            self.stats.unmatched.fetch_add(1, Ordering::Relaxed);
            debug!(
                tracking_id = %tracking_id,
                correlation_id = %response.correlation_id(),
                "Reply for unknown or expired tracking id"
            );
            return false;
        };

        let elapsed = pending.created_at.elapsed();
        match pending.sender.send(response) {
            Ok(()) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                debug!(
                    tracking_id = %tracking_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Delivered reply"
                );
                true
            }
            Err(_) => {
                self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(tracking_id = %tracking_id, "Waiter gone before delivery");
                false
            }
        }
    }

    /// Drop a registration without waiting.
    pub fn cancel(&self, handle: ResponseHandle<R>) -> bool {
        let seq = handle.seq;
        let removed = self
            .pending
            .remove_if(&handle.tracking_id, |_, entry| entry.seq == seq)
            .is_some();
        if removed {
            self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
        }
        handle.settle();
        removed
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, tracking_id: &str) -> bool {
        self.pending.contains_key(tracking_id)
    }

    pub fn stats(&self) -> &CorrelationStats {
        &self.stats
    }
}

impl<R: Tracked + Send + 'static> Default for CorrelationRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}
