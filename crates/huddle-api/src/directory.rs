use std::sync::Arc;

use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use huddle_core::{CoreError, Result, UserDirectory};
use huddle_db::Database;
use huddle_types::UserId;
use huddle_types::api::Claims;

/// `UserDirectory` backed by the users table. Actors are identified by the
/// JWTs issued at register/login.
pub struct SqliteDirectory {
    db: Arc<Database>,
    decoding_key: DecodingKey,
}

impl SqliteDirectory {
    pub fn new(db: Arc<Database>, jwt_secret: &str) -> Self {
        Self {
            db,
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }

    fn row(&self, user: UserId) -> Result<Option<huddle_db::models::UserRow>> {
        let id = i64::try_from(user).map_err(|_| CoreError::not_found(format!("user {user}")))?;
        self.db
            .get_user_by_id(id)
            .map_err(|e| CoreError::Internal(format!("user lookup failed: {e:#}")))
    }
}

impl UserDirectory for SqliteDirectory {
    fn validate_actor(&self, token: &str) -> Result<UserId> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(|e| {
            debug!("Rejected token: {}", e);
            CoreError::denied("invalid token")
        })?;

        let user = data.claims.sub;
        if self.row(user)?.is_none() {
            return Err(CoreError::denied("invalid token"));
        }
        Ok(user)
    }

    fn user_exists(&self, user: UserId) -> Result<bool> {
        Ok(self.row(user)?.is_some())
    }

    fn is_global_owner(&self, user: UserId) -> Result<bool> {
        Ok(self.row(user)?.is_some_and(|row| row.is_global_owner()))
    }

    fn user_handle(&self, user: UserId) -> Result<String> {
        self.row(user)?
            .map(|row| row.handle)
            .ok_or_else(|| CoreError::not_found(format!("user {user}")))
    }
}
