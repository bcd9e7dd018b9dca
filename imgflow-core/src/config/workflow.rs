//! Workflow run configuration.

use std::time::Duration;

use crate::events::DEFAULT_CHANNEL_BUFFER;

/// Limits applied to every control-image processing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Upper bound for each correlated wait. `None` waits indefinitely.
    pub wait_timeout: Option<Duration>,
    /// Per-subscriber buffer of the event bus. Only read at startup.
    pub channel_buffer: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            wait_timeout: None,
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }
}
