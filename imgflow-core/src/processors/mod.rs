//! Event processors.
//!
//! Every processor owns a subscription to the bus and runs until shutdown:
//!
//! - `ControlImageProcessor`: Receives `ControlNetImageProcessed`, emits
//!   `SessionCreateRequested` / `SessionReadyToInvoke`, commits
//!   `ControlNetProcessedImageChanged`
//! - `SessionExecutor`: Receives session commands, emits their results
//! - `MetadataResolver`: Receives image outputs and metadata requests, emits
//!   `ImageMetadataReceived` / `ImageMetadataFailed`

pub mod control_image;
pub mod execution;
pub mod metadata_resolver;
pub mod session_executor;

pub use control_image::{
    ControlImageJob, ControlImageProcessor, ControlImageRun, RunError, RunOutcome, RunStage, Step,
    build_processor_graph,
};
pub use execution::{ExecutionService, ServiceError, http_execution_service};
pub use metadata_resolver::{MetadataLookup, MetadataResolver};
pub use session_executor::{SessionCommand, SessionExecutor};
