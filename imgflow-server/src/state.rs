//! Application state shared across all request handlers.

use imgflow_core::store::Store;
use tokio::sync::watch;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// UI state and the event bus every processor listens on.
    pub store: Store,
    /// Flips to `true` once shutdown starts; long-lived streams end on it.
    pub shutdown_rx: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(store: Store, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self { store, shutdown_rx }
    }
}
