//! MetadataResolver processor.
//!
//! The MetadataResolver is responsible for:
//! - Fetching the stored record of every image an invocation produces
//! - Serving explicit `ImageMetadataRequested` commands
//! - Publishing `ImageMetadataReceived` or `ImageMetadataFailed`
//!
//! Non-image invocation results are ignored.

use std::convert::Infallible;
use std::sync::Arc;

use imgflow_sdk::objects::SocketEvent;
use kanau::processor::Processor;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::execution::ExecutionService;
use crate::events::AppEvent;
use crate::store::Store;

/// Fetch the metadata of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataLookup {
    pub image_name: String,
}

impl MetadataLookup {
    pub fn from_event(event: &AppEvent) -> Option<Self> {
        let image_name = match event {
            AppEvent::ImageMetadataRequested { image_name } => image_name.clone(),
            AppEvent::Socket(SocketEvent::InvocationComplete(complete)) => {
                complete.result.image()?.image_name.clone()
            }
            _ => return None,
        };
        Some(Self { image_name })
    }
}

pub struct MetadataResolver {
    store: Store,
    service: Arc<dyn ExecutionService>,
}

impl MetadataResolver {
    pub fn new(store: Store, service: Arc<dyn ExecutionService>) -> Self {
        Self { store, service }
    }

    /// Resolve lookups until shutdown.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let this = Arc::new(self);
        let mut events = this.store.subscribe();
        let mut lookups: JoinSet<()> = JoinSet::new();

        info!("MetadataResolver started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("MetadataResolver received shutdown signal");
                        break;
                    }
                }

                Some(_) = lookups.join_next(), if !lookups.is_empty() => {}

                event = events.recv() => {
                    let Some(event) = event else {
                        info!("Event bus closed");
                        break;
                    };
                    if let Some(lookup) = MetadataLookup::from_event(&event) {
                        let this = Arc::clone(&this);
                        lookups.spawn(async move {
                            let Ok(reply) = this.process(lookup).await;
                            this.store.dispatch(reply).await;
                        });
                    }
                }
            }
        }

        lookups.shutdown().await;
        info!("MetadataResolver shutdown complete");
    }
}

impl Processor<MetadataLookup> for MetadataResolver {
    type Output = AppEvent;
    type Error = Infallible;

    async fn process(&self, lookup: MetadataLookup) -> Result<AppEvent, Infallible> {
        let MetadataLookup { image_name } = lookup;
        match self.service.get_image_metadata(&image_name).await {
            Ok(image) => {
                debug!(%image_name, width = image.width, height = image.height, "Image metadata received");
                Ok(AppEvent::ImageMetadataReceived { image })
            }
            Err(e) => {
                warn!(%image_name, error = %e, "Failed to fetch image metadata");
                Ok(AppEvent::ImageMetadataFailed {
                    image_name,
                    error: e.to_string(),
                })
            }
        }
    }
}
