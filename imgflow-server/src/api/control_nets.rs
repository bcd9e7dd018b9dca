use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
};
use imgflow_core::events::AppEvent;
use imgflow_core::store::ControlNetEntry;
use imgflow_sdk::objects::{ControlNetResponse, Node, PutControlNetRequest, SetControlImageRequest};

use super::ApiError;
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/control-nets/{control_net_id}",
            put(put_control_net)
                .get(get_control_net)
                .delete(delete_control_net),
        )
        .route("/control-nets/{control_net_id}/image", put(set_control_image))
        .route("/control-nets/{control_net_id}/processor", put(set_processor))
        .route(
            "/control-nets/{control_net_id}/process",
            post(process_control_image),
        )
        .route("/control-nets/{control_net_id}/cancel", post(cancel_processing))
}

fn to_response(entry: ControlNetEntry) -> ControlNetResponse {
    ControlNetResponse {
        control_net_id: entry.control_net_id,
        processor_node: entry.processor_node,
        control_image: entry.control_image,
        processed_control_image: entry.processed_control_image,
        processed_at: entry.processed_at,
    }
}

async fn require(state: &AppState, control_net_id: String) -> Result<ControlNetEntry, ApiError> {
    state
        .store
        .control_net(&control_net_id)
        .await
        .ok_or(ApiError::ControlNetNotFound(control_net_id))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// `PUT /control-nets/{id}` – add or replace a control net.
///
/// Replacing drops any processed image of the previous entry.
async fn put_control_net(
    state: State<AppState>,
    Path(control_net_id): Path<String>,
    Json(body): Json<PutControlNetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .dispatch(AppEvent::ControlNetAdded {
            control_net_id: control_net_id.clone(),
            processor_node: body.processor_node,
            control_image: body.control_image,
        })
        .await;

    let entry = require(&state, control_net_id).await?;
    Ok(Json(to_response(entry)))
}

async fn get_control_net(
    state: State<AppState>,
    Path(control_net_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = require(&state, control_net_id).await?;
    Ok(Json(to_response(entry)))
}

/// `DELETE /control-nets/{id}` – remove a control net.
///
/// Any run still processing it is cancelled.
async fn delete_control_net(
    state: State<AppState>,
    Path(control_net_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = require(&state, control_net_id).await?;
    state
        .store
        .dispatch(AppEvent::ControlNetRemoved {
            control_net_id: entry.control_net_id,
        })
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /control-nets/{id}/image` – attach or detach the control image.
async fn set_control_image(
    state: State<AppState>,
    Path(control_net_id): Path<String>,
    Json(body): Json<SetControlImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = require(&state, control_net_id).await?;
    let control_net_id = entry.control_net_id;
    state
        .store
        .dispatch(AppEvent::ControlNetImageChanged {
            control_net_id: control_net_id.clone(),
            control_image: body.control_image,
        })
        .await;

    let entry = require(&state, control_net_id).await?;
    Ok(Json(to_response(entry)))
}

async fn set_processor(
    state: State<AppState>,
    Path(control_net_id): Path<String>,
    Json(processor_node): Json<Node>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = require(&state, control_net_id).await?;
    let control_net_id = entry.control_net_id;
    state
        .store
        .dispatch(AppEvent::ControlNetProcessorChanged {
            control_net_id: control_net_id.clone(),
            processor_node,
        })
        .await;

    let entry = require(&state, control_net_id).await?;
    Ok(Json(to_response(entry)))
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// `POST /control-nets/{id}/process` – start a processing run.
///
/// Returns `202 Accepted` immediately; the result arrives on the event
/// stream and in the control net's `processed_control_image`.
async fn process_control_image(
    state: State<AppState>,
    Path(control_net_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = require(&state, control_net_id).await?;
    tracing::debug!(control_net_id = %entry.control_net_id, "Control image processing requested");
    state
        .store
        .dispatch(AppEvent::ControlNetImageProcessed {
            control_net_id: entry.control_net_id,
        })
        .await;
    Ok(StatusCode::ACCEPTED)
}

/// `POST /control-nets/{id}/cancel` – cancel in-flight runs.
async fn cancel_processing(
    state: State<AppState>,
    Path(control_net_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = require(&state, control_net_id).await?;
    state
        .store
        .dispatch(AppEvent::ControlNetProcessingCancelled {
            control_net_id: entry.control_net_id,
        })
        .await;
    Ok(StatusCode::ACCEPTED)
}
