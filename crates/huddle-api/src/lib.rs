pub mod auth;
pub mod channels;
pub mod directory;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod standup;
pub mod users;

use huddle_core::CoreError;
use tracing::error;

use crate::error::ApiError;

/// Run a store operation off the async runtime. Core operations take std
/// locks and may hit SQLite through the user directory.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> huddle_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Core(CoreError::Internal(e.to_string()))
        })?
        .map_err(ApiError::from)
}
