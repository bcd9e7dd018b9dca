//! Execution service connection settings.

use std::time::Duration;

use url::Url;

/// Where and how to reach the execution service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    pub base_url: Url,
    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,
}
