//! Socket events pushed by the execution service.
//!
//! Serialized as an adjacently-tagged JSON object:
//!
//! ```json
//! {"event":"invocation_complete","data":{"graph_execution_state_id":"ctx-9", ...}}
//! ```

use serde::{Deserialize, Serialize};

use super::image::ImageRef;

/// Any event the execution service can push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SocketEvent {
    InvocationStarted(InvocationStartedEvent),
    InvocationComplete(InvocationCompleteEvent),
    InvocationError(InvocationErrorEvent),
    GraphExecutionStateComplete(GraphExecutionStateCompleteEvent),
}

impl SocketEvent {
    /// The session this event belongs to.
    pub fn session_id(&self) -> &str {
        match self {
            SocketEvent::InvocationStarted(e) => &e.graph_execution_state_id,
            SocketEvent::InvocationComplete(e) => &e.graph_execution_state_id,
            SocketEvent::InvocationError(e) => &e.graph_execution_state_id,
            SocketEvent::GraphExecutionStateComplete(e) => &e.graph_execution_state_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationStartedEvent {
    pub graph_execution_state_id: String,
    pub source_node_id: String,
}

/// A node finished; `result` holds its typed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationCompleteEvent {
    pub graph_execution_state_id: String,
    pub source_node_id: String,
    pub result: InvocationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationErrorEvent {
    pub graph_execution_state_id: String,
    pub source_node_id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExecutionStateCompleteEvent {
    pub graph_execution_state_id: String,
}

/// Output of one invocation, tagged by `type`.
///
/// Output kinds this crate does not model deserialize as
/// [`InvocationResult::Other`], keeping the `type` they arrived with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResultWire", into = "ResultWire")]
pub enum InvocationResult {
    ImageOutput {
        image: ImageRef,
        width: u32,
        height: u32,
    },
    LatentsOutput {
        latents: LatentsRef,
    },
    Other {
        kind: String,
    },
}

impl InvocationResult {
    /// The image produced by this result, if it is an image output.
    pub fn image(&self) -> Option<&ImageRef> {
        match self {
            InvocationResult::ImageOutput { image, .. } => Some(image),
            _ => None,
        }
    }

    /// The wire `type` of the result, for logging.
    pub fn kind(&self) -> &str {
        match self {
            InvocationResult::ImageOutput { .. } => IMAGE_OUTPUT,
            InvocationResult::LatentsOutput { .. } => LATENTS_OUTPUT,
            InvocationResult::Other { kind } => kind.as_str(),
        }
    }
}

const IMAGE_OUTPUT: &str = "image_output";
const LATENTS_OUTPUT: &str = "latents_output";

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownResult {
    ImageOutput {
        image: ImageRef,
        #[serde(default)]
        width: u32,
        #[serde(default)]
        height: u32,
    },
    LatentsOutput {
        latents: LatentsRef,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ResultWire {
    Known(KnownResult),
    Unknown {
        #[serde(rename = "type")]
        kind: String,
    },
}

impl TryFrom<ResultWire> for InvocationResult {
    type Error = String;

    fn try_from(wire: ResultWire) -> Result<Self, Self::Error> {
        match wire {
            ResultWire::Known(KnownResult::ImageOutput {
                image,
                width,
                height,
            }) => Ok(InvocationResult::ImageOutput {
                image,
                width,
                height,
            }),
            ResultWire::Known(KnownResult::LatentsOutput { latents }) => {
                Ok(InvocationResult::LatentsOutput { latents })
            }
            // A known tag that failed its own shape is malformed, not foreign.
            ResultWire::Unknown { kind } if kind == IMAGE_OUTPUT || kind == LATENTS_OUTPUT => {
                Err(format!("malformed {kind} result"))
            }
            ResultWire::Unknown { kind } => Ok(InvocationResult::Other { kind }),
        }
    }
}

impl From<InvocationResult> for ResultWire {
    fn from(result: InvocationResult) -> Self {
        match result {
            InvocationResult::ImageOutput {
                image,
                width,
                height,
            } => ResultWire::Known(KnownResult::ImageOutput {
                image,
                width,
                height,
            }),
            InvocationResult::LatentsOutput { latents } => {
                ResultWire::Known(KnownResult::LatentsOutput { latents })
            }
            InvocationResult::Other { kind } => ResultWire::Unknown { kind },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatentsRef {
    pub latents_name: String,
}
