//! Shared UI state.

use std::collections::HashMap;

use imgflow_sdk::objects::{ImageDto, Node, SchedulerName};

/// Upper bound on the favorite-scheduler selection.
pub const MAX_FAVORITE_SCHEDULERS: usize = 99;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub control_net: ControlNetState,
    pub ui: UiState,
}

#[derive(Debug, Clone, Default)]
pub struct ControlNetState {
    pub control_nets: HashMap<String, ControlNetEntry>,
}

/// One control net as the UI sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlNetEntry {
    pub control_net_id: String,
    /// Processor invocation applied to the control image.
    pub processor_node: Node,
    /// Source image the user attached.
    pub control_image: Option<ImageDto>,
    /// Result of the most recent successful processing run.
    pub processed_control_image: Option<ImageDto>,
    /// Unix timestamp of the last processed-image commit.
    pub processed_at: Option<i64>,
}

impl ControlNetEntry {
    pub fn new(control_net_id: impl Into<String>, processor_node: Node) -> Self {
        Self {
            control_net_id: control_net_id.into(),
            processor_node,
            control_image: None,
            processed_control_image: None,
            processed_at: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub favorite_schedulers: Vec<SchedulerName>,
}
