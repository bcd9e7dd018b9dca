//! Execution service client (imgflow → execution service).

use reqwest::Client;
use url::Url;

use super::{ClientError, expect_success, parse_response};
use crate::objects::{CreateSessionRequest, Graph, ImageDto, Session};

/// Typed HTTP client for the execution service's session and image APIs.
#[derive(Debug, Clone)]
pub struct ExecutionClient {
    http: Client,
    base_url: Url,
}

impl ExecutionClient {
    /// Create a new `ExecutionClient`.
    ///
    /// * `base_url` – root URL of the execution service (e.g. `http://127.0.0.1:9090`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /api/v1/sessions/` – create a session for `graph`.
    pub async fn create_session(&self, graph: Graph) -> Result<Session, ClientError> {
        let url = self.base_url.join("/api/v1/sessions/")?;

        let resp = self
            .http
            .post(url)
            .json(&CreateSessionRequest { graph })
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `PUT /api/v1/sessions/{session_id}/invoke?all=true` – start executing
    /// every node of the session.
    ///
    /// The service answers `202 Accepted` with no body; progress arrives as
    /// socket events.
    pub async fn invoke_session(&self, session_id: &str) -> Result<(), ClientError> {
        let mut url = self.base_url.join(&format!(
            "/api/v1/sessions/{}/invoke",
            urlencoding::encode(session_id)
        ))?;
        url.query_pairs_mut().append_pair("all", "true");

        let resp = self.http.put(url).send().await?;

        expect_success(resp).await
    }

    /// `GET /api/v1/images/{image_name}/metadata` – fetch the stored image record.
    pub async fn get_image_metadata(&self, image_name: &str) -> Result<ImageDto, ClientError> {
        let url = self.base_url.join(&format!(
            "/api/v1/images/{}/metadata",
            urlencoding::encode(image_name)
        ))?;

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }
}
