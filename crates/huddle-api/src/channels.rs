use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use huddle_types::api::{ChannelsResponse, CreateChannelRequest, CreateChannelResponse, TargetUserRequest};
use huddle_types::{ChannelId, UserId};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::Actor;

pub async fn create(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Json(req): Json<CreateChannelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let channel_id = blocking(move || store.create_channel(actor, &req.name, req.is_public)).await?;
    Ok((StatusCode::CREATED, Json(CreateChannelResponse { channel_id })))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Json<ChannelsResponse>, ApiError> {
    let store = state.store.clone();
    let channels = blocking(move || store.list_mine(actor)).await?;
    Ok(Json(ChannelsResponse { channels }))
}

pub async fn list_all(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Json<ChannelsResponse>, ApiError> {
    let store = state.store.clone();
    let channels = blocking(move || store.list_all(actor)).await?;
    Ok(Json(ChannelsResponse { channels }))
}

pub async fn details(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let details = blocking(move || store.details(actor, channel_id)).await?;
    Ok(Json(details))
}

pub async fn join(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.join(actor, channel_id)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn leave(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.leave(actor, channel_id)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn invite(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
    Json(req): Json<TargetUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.invite(actor, channel_id, req.u_id)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn add_owner(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
    Json(req): Json<TargetUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.add_owner(actor, channel_id, req.u_id)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn remove_owner(
    State(state): State<AppState>,
    Path((channel_id, target)): Path<(ChannelId, UserId)>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.remove_owner(actor, channel_id, target)).await?;
    Ok(Json(serde_json::json!({})))
}
