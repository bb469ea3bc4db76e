use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use huddle_types::ChannelId;
use huddle_types::api::{SendMessageRequest, StandupStartRequest, StandupStartResponse};
use huddle_types::models::StandupStatus;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::Actor;

pub async fn start(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
    Json(req): Json<StandupStartRequest>,
) -> Result<Json<StandupStartResponse>, ApiError> {
    let store = state.store.clone();
    let time_finish = blocking(move || store.standup_start(channel_id, actor, req.length)).await?;

    state.scheduler.watch_standup(channel_id, time_finish);
    Ok(Json(StandupStartResponse { time_finish }))
}

pub async fn active(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Json<StandupStatus>, ApiError> {
    let store = state.store.clone();
    let status = blocking(move || store.standup_active(channel_id, actor)).await?;
    Ok(Json(status))
}

pub async fn send(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.standup_send(channel_id, actor, &req.message)).await?;
    Ok(Json(serde_json::json!({})))
}
