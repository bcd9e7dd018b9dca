//! Event type definitions.
//!
//! Every action in the system (UI-originated triggers, commands to the
//! execution service, results coming back from it, and state commits) is
//! one [`AppEvent`]. Events are ephemeral: they carry just enough to be
//! reduced into state or to be matched by a waiting workflow run.

use imgflow_sdk::objects::{Graph, ImageDto, Node, SchedulerName, Session, SocketEvent};
use uuid::Uuid;

/// Correlation token assigned when a command is dispatched.
///
/// The collaborator that handles the command echoes it back on the
/// fulfilled/rejected event so the dispatching run can recognize its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// All events flowing through the bus.
#[derive(Debug, Clone)]
pub enum AppEvent {
    // -- Control net slice ----------------------------------------------------
    /// A control net was added (or replaced wholesale).
    ControlNetAdded {
        control_net_id: String,
        processor_node: Node,
        control_image: Option<ImageDto>,
    },
    ControlNetRemoved {
        control_net_id: String,
    },
    /// The source image changed; any processed image is now stale.
    ControlNetImageChanged {
        control_net_id: String,
        control_image: Option<ImageDto>,
    },
    ControlNetProcessorChanged {
        control_net_id: String,
        processor_node: Node,
    },
    /// Trigger: run the control net's processor over its control image.
    ControlNetImageProcessed {
        control_net_id: String,
    },
    /// Abandon every in-flight processing run for this control net.
    ControlNetProcessingCancelled {
        control_net_id: String,
    },
    /// Commit: the processed image for a control net.
    ControlNetProcessedImageChanged {
        control_net_id: String,
        processed_control_image: ImageDto,
    },

    // -- Sessions -------------------------------------------------------------
    SessionCreateRequested {
        request_id: RequestId,
        graph: Graph,
    },
    SessionCreated {
        request_id: RequestId,
        session: Session,
    },
    SessionCreateFailed {
        request_id: RequestId,
        error: String,
    },
    SessionReadyToInvoke {
        session_id: String,
    },
    /// Execution of the session has started.
    SessionInvoked {
        session_id: String,
    },
    SessionInvokeFailed {
        session_id: String,
        error: String,
    },

    /// Pushed by the execution service.
    Socket(SocketEvent),

    // -- Images ---------------------------------------------------------------
    ImageMetadataRequested {
        image_name: String,
    },
    ImageMetadataReceived {
        image: ImageDto,
    },
    ImageMetadataFailed {
        image_name: String,
        error: String,
    },

    // -- Settings -------------------------------------------------------------
    FavoriteSchedulersChanged {
        schedulers: Vec<SchedulerName>,
    },
}

impl AppEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::ControlNetAdded { .. } => "control_net_added",
            AppEvent::ControlNetRemoved { .. } => "control_net_removed",
            AppEvent::ControlNetImageChanged { .. } => "control_net_image_changed",
            AppEvent::ControlNetProcessorChanged { .. } => "control_net_processor_changed",
            AppEvent::ControlNetImageProcessed { .. } => "control_net_image_processed",
            AppEvent::ControlNetProcessingCancelled { .. } => "control_net_processing_cancelled",
            AppEvent::ControlNetProcessedImageChanged { .. } => {
                "control_net_processed_image_changed"
            }
            AppEvent::SessionCreateRequested { .. } => "session_create_requested",
            AppEvent::SessionCreated { .. } => "session_created",
            AppEvent::SessionCreateFailed { .. } => "session_create_failed",
            AppEvent::SessionReadyToInvoke { .. } => "session_ready_to_invoke",
            AppEvent::SessionInvoked { .. } => "session_invoked",
            AppEvent::SessionInvokeFailed { .. } => "session_invoke_failed",
            AppEvent::Socket(_) => "socket",
            AppEvent::ImageMetadataRequested { .. } => "image_metadata_requested",
            AppEvent::ImageMetadataReceived { .. } => "image_metadata_received",
            AppEvent::ImageMetadataFailed { .. } => "image_metadata_failed",
            AppEvent::FavoriteSchedulersChanged { .. } => "favorite_schedulers_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }
}
