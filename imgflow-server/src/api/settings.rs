use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use imgflow_core::events::AppEvent;
use imgflow_sdk::objects::{
    SchedulerSettingsResponse, UpdateFavoriteSchedulersRequest, scheduler_options,
};

use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new().route(
        "/settings/schedulers",
        get(get_scheduler_settings).put(put_favorite_schedulers),
    )
}

async fn current_settings(state: &AppState) -> SchedulerSettingsResponse {
    let favorites = state.store.read().await.ui.favorite_schedulers.clone();
    SchedulerSettingsResponse {
        options: scheduler_options(),
        favorites,
    }
}

/// `GET /settings/schedulers` – every scheduler as a labeled option, sorted
/// by label, plus the current favorites.
async fn get_scheduler_settings(state: State<AppState>) -> impl IntoResponse {
    Json(current_settings(&state).await)
}

/// `PUT /settings/schedulers` – replace the favorites.
///
/// Duplicates are dropped and the selection is capped; the response shows
/// what was stored.
async fn put_favorite_schedulers(
    state: State<AppState>,
    Json(body): Json<UpdateFavoriteSchedulersRequest>,
) -> impl IntoResponse {
    state
        .store
        .dispatch(AppEvent::FavoriteSchedulersChanged {
            schedulers: body.favorites,
        })
        .await;
    Json(current_settings(&state).await)
}
