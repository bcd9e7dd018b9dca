//! Boundary to the external execution service.

use async_trait::async_trait;
use imgflow_sdk::client::{ClientError, ExecutionClient};
use imgflow_sdk::objects::{Graph, ImageDto, Session};
use thiserror::Error;

use crate::config::ExecutionConfig;

/// Errors returned by an [`ExecutionService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The HTTP client failed.
    #[error("execution service request failed: {0}")]
    Client(#[from] ClientError),

    /// The service could not be reached or refused the operation.
    #[error("execution service unavailable: {0}")]
    Unavailable(String),
}

/// Operations the processors need from the execution service.
///
/// The HTTP implementation is [`ExecutionClient`]; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Create a session that will execute `graph`.
    async fn create_session(&self, graph: Graph) -> Result<Session, ServiceError>;

    /// Start executing a previously created session.
    async fn invoke_session(&self, session_id: &str) -> Result<(), ServiceError>;

    /// Fetch the stored record of an image.
    async fn get_image_metadata(&self, image_name: &str) -> Result<ImageDto, ServiceError>;
}

#[async_trait]
impl ExecutionService for ExecutionClient {
    async fn create_session(&self, graph: Graph) -> Result<Session, ServiceError> {
        Ok(ExecutionClient::create_session(self, graph).await?)
    }

    async fn invoke_session(&self, session_id: &str) -> Result<(), ServiceError> {
        Ok(ExecutionClient::invoke_session(self, session_id).await?)
    }

    async fn get_image_metadata(&self, image_name: &str) -> Result<ImageDto, ServiceError> {
        Ok(ExecutionClient::get_image_metadata(self, image_name).await?)
    }
}

/// Build the HTTP execution service client from config.
pub fn http_execution_service(config: &ExecutionConfig) -> Result<ExecutionClient, ServiceError> {
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ServiceError::Client(ClientError::Http(e)))?;
    Ok(ExecutionClient::new(config.base_url.clone()).with_http_client(http))
}
