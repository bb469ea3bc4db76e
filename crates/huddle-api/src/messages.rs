use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use huddle_types::api::{
    EditMessageRequest, ReactRequest, SearchResponse, SendLaterRequest, SendLaterResponse,
    SendMessageRequest, SendMessageResponse,
};
use huddle_types::models::MessagePage;
use huddle_types::{ChannelId, MessageId};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::Actor;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub start: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query_str: String,
}

pub async fn page(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    query: Result<Query<PageQuery>, QueryRejection>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Json<MessagePage>, ApiError> {
    let Query(query) = query?;
    let store = state.store.clone();
    let page = blocking(move || store.page(channel_id, actor, query.start)).await?;
    Ok(Json(page))
}

pub async fn send(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let message_id = blocking(move || store.send(channel_id, actor, &req.message)).await?;
    Ok((StatusCode::CREATED, Json(SendMessageResponse { message_id })))
}

/// Accepts the message now and posts it at `time_sent`. The id is not known
/// until then, so the response only echoes the time.
pub async fn send_later(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(Actor(actor)): Extension<Actor>,
    Json(req): Json<SendLaterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let time_sent = req.time_sent;
    let scheduler = state.scheduler.clone();
    // The receiver is dropped; the scheduler logs the outcome.
    blocking(move || {
        scheduler
            .send_later(channel_id, actor, req.message, time_sent)
            .map(drop)
    })
    .await?;
    Ok((StatusCode::ACCEPTED, Json(SendLaterResponse { time_sent })))
}

pub async fn edit(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(Actor(actor)): Extension<Actor>,
    Json(req): Json<EditMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.edit(actor, message_id, &req.message)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.remove(actor, message_id)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn react(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(Actor(actor)): Extension<Actor>,
    Json(req): Json<ReactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.react(actor, message_id, req.react_id)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn unreact(
    State(state): State<AppState>,
    Path((message_id, react_id)): Path<(MessageId, u32)>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.unreact(actor, message_id, react_id)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn pin(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.pin(actor, message_id)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn unpin(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    blocking(move || store.unpin(actor, message_id)).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(query) = query?;
    let store = state.store.clone();
    let messages = blocking(move || store.search(actor, &query.query_str)).await?;
    Ok(Json(SearchResponse { messages }))
}
