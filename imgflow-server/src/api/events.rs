use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures_util::{Stream, StreamExt};
use imgflow_core::events::AppEvent;
use imgflow_sdk::objects::{ProcessedImageCommit, SocketEvent};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::state::AppState;

/// SSE event name of a processed-image commit.
const PROCESSED_IMAGE_EVENT: &str = "control_net_processed_image_changed";

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(ingest_socket_event))
        .route("/events/stream", get(processed_image_stream))
}

/// `POST /events` – ingest an event pushed by the execution service.
async fn ingest_socket_event(
    state: State<AppState>,
    Json(event): Json<SocketEvent>,
) -> impl IntoResponse {
    tracing::debug!(session_id = event.session_id(), "Socket event received");
    state.store.dispatch(AppEvent::Socket(event)).await;
    StatusCode::ACCEPTED
}

/// `GET /events/stream` – stream of processed-image commits.
///
/// Each commit is sent as one SSE event named
/// `control_net_processed_image_changed` with a [`ProcessedImageCommit`]
/// JSON payload. The stream ends when the server shuts down.
async fn processed_image_stream(
    state: State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.store.subscribe().into_inner();
    let mut shutdown_rx = state.shutdown_rx.clone();
    let shutdown = async move {
        let _ = shutdown_rx.wait_for(|stop| *stop).await;
    };

    let stream = BroadcastStream::new(rx)
        .filter_map(|item| async move {
            match item {
                Ok(AppEvent::ControlNetProcessedImageChanged {
                    control_net_id,
                    processed_control_image,
                }) => Some(ProcessedImageCommit {
                    control_net_id,
                    processed_control_image,
                }),
                Ok(_) => None,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE: event stream lagged, commits dropped");
                    None
                }
            }
        })
        .map(|commit| Event::default().event(PROCESSED_IMAGE_EVENT).json_data(commit))
        .take_until(shutdown);

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
