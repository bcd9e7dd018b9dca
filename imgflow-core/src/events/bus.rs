//! Fan-out event bus.
//!
//! Every processor and every workflow run holds its own [`Subscription`] and
//! sees every event published after it subscribed. Filtering happens on the
//! receiving side.

use super::types::AppEvent;
use tokio::sync::broadcast;
use tracing::warn;

/// Default buffer size for the bus.
///
/// A subscriber that falls more than this many events behind loses the
/// oldest ones.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Cloneable publishing handle.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// Create a new bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to every current subscriber.
    ///
    /// Returns the number of subscribers that received it. Publishing with no
    /// subscribers is not an error.
    pub fn publish(&self, event: AppEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to every event published from now on.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_BUFFER)
    }
}

/// One subscriber's view of the bus.
pub struct Subscription {
    rx: broadcast::Receiver<AppEvent>,
}

impl Subscription {
    /// Receive the next event.
    ///
    /// Lag is logged and skipped. Returns `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<AppEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event subscription lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take an already-buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<AppEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event subscription lagged, events dropped");
                }
                Err(_) => return None,
            }
        }
    }

    /// Consume the subscription, yielding the raw receiver.
    pub fn into_inner(self) -> broadcast::Receiver<AppEvent> {
        self.rx
    }
}
