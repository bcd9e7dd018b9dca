//! HTTP API handlers.
//!
//! # Endpoints (under `/api/v1`)
//!
//! - `PUT    /control-nets/{id}`            – add or replace a control net
//! - `GET    /control-nets/{id}`            – current control net state
//! - `DELETE /control-nets/{id}`            – remove a control net
//! - `PUT    /control-nets/{id}/image`      – attach or detach the control image
//! - `PUT    /control-nets/{id}/processor`  – replace the processor node
//! - `POST   /control-nets/{id}/process`    – start a processing run
//! - `POST   /control-nets/{id}/cancel`     – cancel in-flight runs
//! - `POST   /events`                       – ingest an execution-service event
//! - `GET    /events/stream`                – SSE stream of processed-image commits
//! - `GET    /settings/schedulers`          – scheduler options and favorites
//! - `PUT    /settings/schedulers`          – replace favorite schedulers

mod control_nets;
mod events;
mod settings;

use axum::{Router, http::StatusCode, response::IntoResponse};

use crate::state::AppState;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(control_nets::router())
        .merge(events::router())
        .merge(settings::router())
}

/// Errors that can occur in API handlers.
#[derive(Debug)]
enum ApiError {
    /// No control net with this id.
    ControlNetNotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::ControlNetNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("control net {id} not found")).into_response()
            }
        }
    }
}
