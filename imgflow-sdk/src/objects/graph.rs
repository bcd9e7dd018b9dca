//! Execution graph types.
//!
//! A graph is a set of invocation nodes keyed by node id plus the edges
//! wiring their fields together. Control-image processing always submits a
//! single processor node and no edges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::image::ImageRef;

/// One invocation node.
///
/// Processor-specific parameters (thresholds, resolutions, ...) are kept in
/// `params` so that new processor kinds do not need a schema change here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub is_intermediate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            is_intermediate: false,
            image: None,
            params: serde_json::Map::new(),
        }
    }

    /// Set a processor parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Endpoint of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeConnection {
    pub node_id: String,
    pub field: String,
}

/// Connects an output field of one node to an input field of another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: EdgeConnection,
    pub destination: EdgeConnection,
}

/// A graph submitted to the execution service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: BTreeMap<String, Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
}

impl Graph {
    /// A graph made of exactly one node and no edges.
    pub fn single(node: Node) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(node.id.clone(), node);
        Self {
            nodes,
            edges: Vec::new(),
        }
    }
}
