//! Shared UI state store.
//!
//! [`Store::dispatch`] is the single entry point for events: it reduces the
//! event into [`AppState`] and then publishes it on the bus, so listeners
//! always observe state that already includes the event they are handling.

mod reducer;
mod state;

pub use reducer::reduce;
pub use state::{AppState, ControlNetEntry, ControlNetState, MAX_FAVORITE_SCHEDULERS, UiState};

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::trace;

use crate::events::{AppEvent, EventBus, Subscription};

/// State plus bus. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<AppState>>,
    bus: EventBus,
}

impl Store {
    pub fn new(bus: EventBus) -> Self {
        Self::with_state(bus, AppState::default())
    }

    pub fn with_state(bus: EventBus, state: AppState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            bus,
        }
    }

    /// Reduce `event` into state, then publish it.
    ///
    /// The write lock is held while publishing so the order subscribers
    /// observe matches the order reductions were applied.
    pub async fn dispatch(&self, event: AppEvent) {
        let mut state = self.state.write().await;
        let changed = reduce(&mut state, &event);
        trace!(event = event.name(), changed, "Dispatching event");
        self.bus.publish(event);
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().await
    }

    /// Clone out a single control net.
    pub async fn control_net(&self, control_net_id: &str) -> Option<ControlNetEntry> {
        self.state
            .read()
            .await
            .control_net
            .control_nets
            .get(control_net_id)
            .cloned()
    }

    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgflow_sdk::objects::Node;

    #[tokio::test]
    async fn test_listeners_observe_reduced_state() {
        let store = Store::new(EventBus::new(8));
        let mut sub = store.subscribe();

        store
            .dispatch(AppEvent::ControlNetAdded {
                control_net_id: "cn-1".into(),
                processor_node: Node::new("p", "canny_image_processor"),
                control_image: None,
            })
            .await;

        assert!(matches!(
            sub.recv().await,
            Some(AppEvent::ControlNetAdded { .. })
        ));
        assert!(store.control_net("cn-1").await.is_some());
    }
}
