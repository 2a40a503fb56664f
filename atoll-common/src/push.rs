//! Single-subscriber push channel to the viewer.
//!
//! At most one real-time client (the viewer) is ever connected. The link
//! holds the current subscriber's outbound queue behind a lock. Registering
//! a new subscriber replaces the old one without closing its socket, and
//! every delivery is best-effort: failures are logged and swallowed, never
//! surfaced to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

/// Instruction consumed by a subscriber's writer task.
#[derive(Debug, PartialEq, Eq)]
pub enum Outbound {
    /// Serialized JSON payload to forward to the client.
    Frame(String),
    /// Close the socket and end the writer task.
    Close,
}

/// Sending half of a subscriber's outbound queue.
///
/// The connection handler drains the receiving half into its socket from a
/// single writer task, so frames queued here never interleave on the wire.
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

struct Subscriber {
    generation: u64,
    sender: OutboundSender,
}

struct Inner {
    slot: RwLock<Option<Subscriber>>,
    next_generation: AtomicU64,
}

/// Handle to the (at most one) connected viewer.
///
/// Clones share the same slot; the link travels through application state
/// rather than living in a global.
#[derive(Clone)]
pub struct ViewerLink {
    inner: Arc<Inner>,
}

impl ViewerLink {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: RwLock::new(None),
                next_generation: AtomicU64::new(1),
            }),
        }
    }

    /// Install `sender` as the sole subscriber and return its generation.
    ///
    /// A previously registered subscriber is simply dropped from the slot:
    /// its socket stays open but receives nothing further, and its own
    /// teardown becomes a no-op.
    pub async fn register(&self, sender: OutboundSender) -> u64 {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.inner.slot.write().await;
        match slot.replace(Subscriber { generation, sender }) {
            Some(previous) => {
                debug!(generation, replaced = previous.generation, "viewer subscriber replaced")
            }
            None => debug!(generation, "viewer subscriber registered"),
        }
        generation
    }

    /// Drop the subscriber registered under `generation` and instruct its
    /// writer to close the socket.
    ///
    /// Generations that are no longer current are ignored, so a dying old
    /// connection can never evict the subscriber that replaced it. Safe to
    /// call repeatedly.
    pub async fn unregister(&self, generation: u64) {
        let mut slot = self.inner.slot.write().await;
        if let Some(current) = slot.as_ref() {
            if current.generation != generation {
                return;
            }
        } else {
            return;
        }

        if let Some(subscriber) = slot.take() {
            // Delivery failure just means the writer is already gone
            let _ = subscriber.sender.send(Outbound::Close);
            debug!(generation, "viewer subscriber unregistered");
        }
    }

    /// Serialize `payload` and queue it for the current subscriber.
    ///
    /// With no subscriber, or a subscriber whose writer task has ended, the
    /// frame is dropped and a log line is the only trace.
    pub async fn broadcast<T: Serialize>(&self, payload: &T) {
        let frame = match serde_json::to_string(payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("failed to serialize push payload: {}", e);
                return;
            }
        };

        let slot = self.inner.slot.read().await;
        match slot.as_ref() {
            Some(subscriber) => {
                if subscriber.sender.send(Outbound::Frame(frame)).is_err() {
                    warn!(
                        generation = subscriber.generation,
                        "viewer writer gone, push frame dropped"
                    );
                }
            }
            None => debug!("no viewer connected, push skipped"),
        }
    }

    /// Whether a subscriber is currently registered.
    pub async fn is_subscribed(&self) -> bool {
        self.inner.slot.read().await.is_some()
    }
}

impl Default for ViewerLink {
    fn default() -> Self {
        Self::new()
    }
}
