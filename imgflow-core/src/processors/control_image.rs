//! ControlImageProcessor processor.
//!
//! The ControlImageProcessor is responsible for:
//! - Receiving `ControlNetImageProcessed` triggers
//! - Running one independent workflow per trigger: create a session for the
//!   control net's processor node, invoke it, wait for the image output and
//!   its metadata, then commit `ControlNetProcessedImageChanged`
//! - Cancelling in-flight runs on `ControlNetProcessingCancelled`,
//!   `ControlNetRemoved`, a changed control image or a replaced entry, and
//!   on shutdown
//!
//! Each run is a [`ControlImageRun`] state machine. A driver feeds it events
//! from the run's own subscription, bounded by the configured wait timeout
//! and the run's cancel signal.

use std::sync::Arc;

use imgflow_sdk::objects::{Graph, ImageDto, Node, SocketEvent};
use kanau::processor::Processor;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigStore, WorkflowConfig};
use crate::events::{AppEvent, RequestId, WaitError};
use crate::store::{ControlNetEntry, Store};

// ---------------------------------------------------------------------------
// Public data types
// ---------------------------------------------------------------------------

/// The wait a run is suspended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    AwaitingSession,
    AwaitingInvocation,
    AwaitingMetadata,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::AwaitingSession => write!(f, "awaiting_session"),
            RunStage::AwaitingInvocation => write!(f, "awaiting_invocation"),
            RunStage::AwaitingMetadata => write!(f, "awaiting_metadata"),
        }
    }
}

/// Ways a run can end without committing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("control net {0} not found")]
    ControlNetNotFound(String),

    #[error("control net {0} has no control image")]
    MissingControlImage(String),

    #[error("session creation rejected: {0}")]
    SessionRejected(String),

    #[error("invocation failed: {0}")]
    InvocationFailed(String),

    #[error("image metadata fetch failed: {0}")]
    MetadataRejected(String),

    #[error("timed out while {stage}")]
    TimedOut { stage: RunStage },

    #[error("cancelled while {stage}")]
    Cancelled { stage: RunStage },

    #[error("event bus closed while {stage}")]
    BusClosed { stage: RunStage },
}

impl RunError {
    fn from_wait(err: WaitError, stage: RunStage) -> Self {
        match err {
            WaitError::TimedOut => RunError::TimedOut { stage },
            WaitError::Cancelled => RunError::Cancelled { stage },
            WaitError::Closed => RunError::BusClosed { stage },
        }
    }
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The processed image was committed to the store.
    Committed { processed_control_image: ImageDto },
    /// The invocation produced something other than an image; nothing was
    /// committed.
    UnhandledResult { kind: String },
}

/// Result of feeding one matching event into a run.
#[derive(Debug, Clone)]
pub enum Step {
    /// Moved to the next wait; dispatch this command.
    Emit(AppEvent),
    /// Moved to the next wait; nothing to dispatch.
    Advance,
    /// Final: commit this image.
    Commit(ImageDto),
    /// Final: ended without commit.
    Finish(RunOutcome),
    /// Final: a collaborator rejected the run.
    Fail(RunError),
}

/// Input to the [`Processor`] impl: run one workflow to completion.
pub struct ControlImageJob {
    pub control_net_id: String,
    pub cancel: watch::Receiver<bool>,
}

impl ControlImageJob {
    /// Create a job together with the sender that cancels it.
    pub fn new(control_net_id: impl Into<String>) -> (Self, watch::Sender<bool>) {
        let (cancel_tx, cancel) = watch::channel(false);
        (
            Self {
                control_net_id: control_net_id.into(),
                cancel,
            },
            cancel_tx,
        )
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum RunState {
    AwaitingSession { request_id: RequestId },
    AwaitingInvocation { session_id: String },
    AwaitingMetadata { image_name: String },
}

/// Workflow state for one run. Owned by the task driving it.
#[derive(Debug)]
pub struct ControlImageRun {
    control_net_id: String,
    state: RunState,
}

/// A single-node graph running `processor_node` over `control_image`.
///
/// The node is marked intermediate and its `image` field carries only the
/// image name.
pub fn build_processor_graph(processor_node: &Node, control_image: &ImageDto) -> Graph {
    let mut node = processor_node.clone();
    node.is_intermediate = true;
    node.image = Some(control_image.to_ref());
    Graph::single(node)
}

impl ControlImageRun {
    /// Check preconditions and build the first command.
    ///
    /// Fails without side effects when the control net has no control image.
    pub fn start(entry: &ControlNetEntry) -> Result<(Self, AppEvent), RunError> {
        let Some(control_image) = entry.control_image.as_ref() else {
            return Err(RunError::MissingControlImage(entry.control_net_id.clone()));
        };

        let request_id = RequestId::new();
        let command = AppEvent::SessionCreateRequested {
            request_id,
            graph: build_processor_graph(&entry.processor_node, control_image),
        };
        let run = Self {
            control_net_id: entry.control_net_id.clone(),
            state: RunState::AwaitingSession { request_id },
        };
        Ok((run, command))
    }

    pub fn control_net_id(&self) -> &str {
        &self.control_net_id
    }

    pub fn stage(&self) -> RunStage {
        match self.state {
            RunState::AwaitingSession { .. } => RunStage::AwaitingSession,
            RunState::AwaitingInvocation { .. } => RunStage::AwaitingInvocation,
            RunState::AwaitingMetadata { .. } => RunStage::AwaitingMetadata,
        }
    }

    /// Feed an event. Returns `None` if the event does not belong to this run
    /// in its current state.
    pub fn on_event(&mut self, event: &AppEvent) -> Option<Step> {
        let (next, step) = match (&self.state, event) {
            (
                RunState::AwaitingSession { request_id },
                AppEvent::SessionCreated {
                    request_id: answered,
                    session,
                },
            ) if answered == request_id => (
                Some(RunState::AwaitingInvocation {
                    session_id: session.id.clone(),
                }),
                Step::Emit(AppEvent::SessionReadyToInvoke {
                    session_id: session.id.clone(),
                }),
            ),
            (
                RunState::AwaitingSession { request_id },
                AppEvent::SessionCreateFailed {
                    request_id: answered,
                    error,
                },
            ) if answered == request_id => {
                (None, Step::Fail(RunError::SessionRejected(error.clone())))
            }

            (
                RunState::AwaitingInvocation { session_id },
                AppEvent::Socket(SocketEvent::InvocationComplete(complete)),
            ) if complete.graph_execution_state_id == *session_id => {
                match complete.result.image() {
                    Some(image) => (
                        Some(RunState::AwaitingMetadata {
                            image_name: image.image_name.clone(),
                        }),
                        Step::Advance,
                    ),
                    None => (
                        None,
                        Step::Finish(RunOutcome::UnhandledResult {
                            kind: complete.result.kind().to_owned(),
                        }),
                    ),
                }
            }
            (
                RunState::AwaitingInvocation { session_id },
                AppEvent::Socket(SocketEvent::InvocationError(failed)),
            ) if failed.graph_execution_state_id == *session_id => (
                None,
                Step::Fail(RunError::InvocationFailed(failed.error.clone())),
            ),
            (
                RunState::AwaitingInvocation { session_id },
                AppEvent::SessionInvokeFailed {
                    session_id: failed,
                    error,
                },
            ) if failed == session_id => {
                (None, Step::Fail(RunError::InvocationFailed(error.clone())))
            }

            (
                RunState::AwaitingMetadata { image_name },
                AppEvent::ImageMetadataReceived { image },
            ) if image.image_name == *image_name => (None, Step::Commit(image.clone())),
            (
                RunState::AwaitingMetadata { image_name },
                AppEvent::ImageMetadataFailed {
                    image_name: failed,
                    error,
                },
            ) if failed == image_name => {
                (None, Step::Fail(RunError::MetadataRejected(error.clone())))
            }

            _ => return None,
        };

        if let Some(next) = next {
            self.state = next;
        }
        Some(step)
    }
}

// ---------------------------------------------------------------------------
// ControlImageProcessor
// ---------------------------------------------------------------------------

struct ActiveRun {
    control_net_id: String,
    cancel_tx: watch::Sender<bool>,
}

/// Runs control-image processing workflows.
pub struct ControlImageProcessor {
    store: Store,
    config: ConfigStore<WorkflowConfig>,
}

impl ControlImageProcessor {
    pub fn new(store: Store, config: ConfigStore<WorkflowConfig>) -> Self {
        Self { store, config }
    }

    /// Listen for triggers until shutdown is signaled.
    ///
    /// Every trigger gets its own task; triggers for the same control net do
    /// not wait for each other. On shutdown every in-flight run is cancelled
    /// and awaited.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let this = Arc::new(self);
        let mut events = this.store.subscribe();
        let mut config_watcher = this.config.subscribe();
        let mut runs: JoinSet<()> = JoinSet::new();
        let mut active: Vec<ActiveRun> = Vec::new();

        info!("ControlImageProcessor started");

        loop {
            tokio::select! {
                biased;

                // Shutdown has highest priority.
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("ControlImageProcessor received shutdown signal");
                        break;
                    }
                }

                // A run finished; forget its cancel handle.
                Some(_) = runs.join_next(), if !runs.is_empty() => {
                    active.retain(|run| !run.cancel_tx.is_closed());
                }

                Ok(()) = config_watcher.changed() => {
                    let config = this.config.snapshot().await;
                    info!(
                        version = this.config.version(),
                        wait_timeout = ?config.wait_timeout,
                        "ControlImageProcessor picked up new workflow config"
                    );
                }

                event = events.recv() => match event {
                    Some(AppEvent::ControlNetImageProcessed { control_net_id }) => {
                        let (job, cancel_tx) = ControlImageJob::new(control_net_id.clone());
                        active.push(ActiveRun { control_net_id, cancel_tx });
                        let this = Arc::clone(&this);
                        runs.spawn(async move {
                            let _ = this.execute(job).await;
                        });
                    }
                    // A new source or a replaced entry makes in-flight output stale.
                    Some(AppEvent::ControlNetProcessingCancelled { control_net_id })
                    | Some(AppEvent::ControlNetRemoved { control_net_id })
                    | Some(AppEvent::ControlNetImageChanged { control_net_id, .. })
                    | Some(AppEvent::ControlNetAdded { control_net_id, .. }) => {
                        cancel_runs(&active, &control_net_id);
                    }
                    Some(_) => {}
                    None => {
                        info!("Event bus closed");
                        break;
                    }
                },
            }
        }

        // -- Cleanup --------------------------------------------------------
        for run in &active {
            let _ = run.cancel_tx.send(true);
        }
        while runs.join_next().await.is_some() {}

        info!("ControlImageProcessor shutdown complete");
    }

    /// Drive one workflow run to its end.
    #[tracing::instrument(skip_all, name = "control_image_run", fields(control_net_id = %job.control_net_id))]
    pub async fn execute(&self, job: ControlImageJob) -> Result<RunOutcome, RunError> {
        let ControlImageJob {
            control_net_id,
            mut cancel,
        } = job;

        let Some(entry) = self.store.control_net(&control_net_id).await else {
            error!("Unable to process control image, control net not found");
            return Err(RunError::ControlNetNotFound(control_net_id));
        };
        let (mut run, command) = ControlImageRun::start(&entry).inspect_err(|e| {
            error!(error = %e, "Unable to process control image");
        })?;

        let wait_timeout = self.config.snapshot().await.wait_timeout;

        // Subscribe before the first command so no answer can slip past.
        let mut sub = self.store.subscribe();
        self.store.dispatch(command).await;

        loop {
            let stage = run.stage();
            let step = sub
                .take(|event| run.on_event(event), wait_timeout, &mut cancel)
                .await
                .map_err(|e| RunError::from_wait(e, stage));

            let step = match step {
                Ok(step) => step,
                Err(e) => {
                    match &e {
                        RunError::Cancelled { .. } => info!(%stage, "Control image run cancelled"),
                        _ => warn!(%stage, error = %e, "Control image run abandoned"),
                    }
                    return Err(e);
                }
            };

            match step {
                Step::Emit(command) => {
                    debug!(stage = %run.stage(), command = command.name(), "Run advanced");
                    self.store.dispatch(command).await;
                }
                Step::Advance => {
                    debug!(stage = %run.stage(), "Run advanced");
                }
                Step::Commit(processed_control_image) => {
                    info!(
                        image_name = %processed_control_image.image_name,
                        "Control image processed"
                    );
                    self.store
                        .dispatch(AppEvent::ControlNetProcessedImageChanged {
                            control_net_id: run.control_net_id().to_owned(),
                            processed_control_image: processed_control_image.clone(),
                        })
                        .await;
                    return Ok(RunOutcome::Committed {
                        processed_control_image,
                    });
                }
                Step::Finish(outcome) => {
                    debug!(?outcome, "Invocation produced no image, nothing to commit");
                    return Ok(outcome);
                }
                Step::Fail(e) => {
                    warn!(stage = %stage, error = %e, "Control image run failed");
                    return Err(e);
                }
            }
        }
    }
}

fn cancel_runs(active: &[ActiveRun], control_net_id: &str) {
    for run in active.iter().filter(|r| r.control_net_id == control_net_id) {
        if run.cancel_tx.send(true).is_ok() {
            info!(control_net_id, "Cancelling control image run");
        }
    }
}

// ---------------------------------------------------------------------------
// Processor trait implementation
// ---------------------------------------------------------------------------

impl Processor<ControlImageJob> for ControlImageProcessor {
    type Output = RunOutcome;
    type Error = RunError;

    async fn process(&self, job: ControlImageJob) -> Result<RunOutcome, RunError> {
        self.execute(job).await
    }
}
