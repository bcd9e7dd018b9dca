//! Event system for the event-driven architecture.
//!
//! This module provides the event type, the fan-out bus every component
//! listens on, and correlated waits over a subscription.
//!
//! # Event Flow
//!
//! 1. `ControlNetImageProcessed` -> `ControlImageProcessor` starts a run
//! 2. run emits `SessionCreateRequested` -> `SessionExecutor` emits `SessionCreated`
//! 3. run emits `SessionReadyToInvoke` -> `SessionExecutor` invokes the session
//! 4. execution service pushes `InvocationComplete` -> `MetadataResolver` emits
//!    `ImageMetadataReceived`
//! 5. run commits `ControlNetProcessedImageChanged`
//!
//! Each run subscribes before emitting its first command and matches every
//! answer by its own request id, session id or output image name.

pub mod bus;
pub mod types;
pub mod wait;

pub use bus::{DEFAULT_CHANNEL_BUFFER, EventBus, Subscription};
pub use types::{AppEvent, RequestId};
pub use wait::{WaitError, cancelled};
