//! TOML file configuration structures.
//!
//! These structs directly map to the `imgflow-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Execution service section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Root URL of the execution service API (e.g., "http://127.0.0.1:9090").
    pub base_url: Url,
    /// Timeout for a single HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Workflow runner section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Bound for each wait of a processing run. Absent means no bound.
    #[serde(default)]
    pub wait_timeout_secs: Option<u64>,
    /// Per-subscriber event buffer. Changes need a restart.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: None,
            channel_buffer: default_channel_buffer(),
        }
    }
}

fn default_channel_buffer() -> usize {
    imgflow_core::events::DEFAULT_CHANNEL_BUFFER
}
