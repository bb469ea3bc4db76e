use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{channels, messages, standup, users};

/// Every HTTP route. Everything except auth and health sits behind
/// [`require_auth`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/channels", post(channels::create).get(channels::list_mine))
        .route("/channels/all", get(channels::list_all))
        .route("/channels/{channel_id}", get(channels::details))
        .route("/channels/{channel_id}/join", post(channels::join))
        .route("/channels/{channel_id}/leave", post(channels::leave))
        .route("/channels/{channel_id}/invite", post(channels::invite))
        .route("/channels/{channel_id}/owners", post(channels::add_owner))
        .route("/channels/{channel_id}/owners/{u_id}", delete(channels::remove_owner))
        .route("/channels/{channel_id}/messages", get(messages::page).post(messages::send))
        .route("/channels/{channel_id}/messages/later", post(messages::send_later))
        .route("/channels/{channel_id}/standup", post(standup::start).get(standup::active))
        .route("/channels/{channel_id}/standup/messages", post(standup::send))
        .route("/messages/{message_id}", put(messages::edit).delete(messages::remove))
        .route("/messages/{message_id}/reactions", post(messages::react))
        .route("/messages/{message_id}/reactions/{react_id}", delete(messages::unreact))
        .route("/messages/{message_id}/pin", post(messages::pin).delete(messages::unpin))
        .route("/search", get(messages::search))
        .route("/users/all", get(users::all_users))
        .route("/user/profile", get(users::profile))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
