//! Execution sessions.

use serde::{Deserialize, Serialize};

use super::graph::Graph;

/// Request body for `POST /api/v1/sessions/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub graph: Graph,
}

/// The execution service's handle for one graph invocation.
///
/// The service returns the full graph execution state; only the id and the
/// submitted graph are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub graph: Graph,
}
