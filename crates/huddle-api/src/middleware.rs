use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use huddle_types::UserId;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

/// Authenticated caller, inserted as a request extension by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub UserId);

/// Extract the bearer token and resolve it through the user directory.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::denied("missing bearer token"))?
        .to_string();

    let store = state.store.clone();
    let user = blocking(move || store.directory().validate_actor(&token)).await?;

    req.extensions_mut().insert(Actor(user));
    Ok(next.run(req).await)
}
