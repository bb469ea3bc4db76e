use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use huddle_core::CoreError;
use huddle_types::api::{ProfileQuery, ProfileResponse, UsersResponse};

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn all_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
    let db = state.db.clone();
    let rows = tokio::task::spawn_blocking(move || db.get_all_users())
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(UsersResponse {
        users: rows.iter().map(|row| row.profile()).collect(),
    }))
}

pub async fn profile(
    State(state): State<AppState>,
    query: Result<Query<ProfileQuery>, QueryRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Query(ProfileQuery { u_id }) = query?;
    let id = i64::try_from(u_id).map_err(|_| CoreError::not_found(format!("user {u_id}")))?;

    let db = state.db.clone();
    let row = tokio::task::spawn_blocking(move || db.get_user_by_id(id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??
        .ok_or_else(|| CoreError::not_found(format!("user {u_id}")))?;

    Ok(Json(ProfileResponse { user: row.profile() }))
}
