use std::sync::{Arc, LazyLock};

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use regex::Regex;
use tracing::info;

use huddle_core::{Scheduler, Store};
use huddle_db::Database;
use huddle_db::models::UserRow;
use huddle_db::queries::NewUser;
use huddle_types::UserId;
use huddle_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub store: Arc<Store>,
    pub scheduler: Scheduler,
    pub jwt_secret: String,
}

const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 50;
const MAX_NAME_LEN: usize = 50;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if !valid_email(&req.email) {
        return Err(ApiError::invalid("invalid email"));
    }
    let password_len = req.password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password_len) {
        return Err(ApiError::invalid(format!(
            "password must be {MIN_PASSWORD_LEN} to {MAX_PASSWORD_LEN} characters"
        )));
    }
    for name in [&req.name_first, &req.name_last] {
        if !(1..=MAX_NAME_LEN).contains(&name.chars().count()) {
            return Err(ApiError::invalid(format!("names must be 1 to {MAX_NAME_LEN} characters")));
        }
    }

    let db = state.db.clone();
    let user = tokio::task::spawn_blocking(move || -> Result<UserRow, ApiError> {
        if db.email_taken(&req.email)? {
            return Err(ApiError::invalid("email is already registered"));
        }

        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
            .to_string();

        Ok(db.create_user(&NewUser {
            email: &req.email,
            password_hash: &password_hash,
            name_first: &req.name_first,
            name_last: &req.name_last,
        })?)
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let token = create_token(&state.jwt_secret, user.u_id(), &user.handle)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            u_id: user.u_id(),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let user = tokio::task::spawn_blocking(move || -> Result<UserRow, ApiError> {
        let user = db
            .get_user_by_email(&req.email)?
            .ok_or_else(|| ApiError::invalid("email does not belong to a registered user"))?;

        // Verify password
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|e| anyhow::anyhow!("stored hash unreadable: {}", e))?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiError::invalid("incorrect password"))?;

        Ok(user)
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let token = create_token(&state.jwt_secret, user.u_id(), &user.handle)?;
    info!("User {} logged in", user.id);

    Ok(Json(AuthResponse {
        u_id: user.u_id(),
        token,
    }))
}

pub fn create_token(secret: &str, user: UserId, handle: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user,
        handle: handle.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\w+([\.-]?\w+)*@\w+([\.-]?\w+)*(\.\w{2,3})+$").ok());

/// `local@domain.tld` where dots and dashes only join word runs and every
/// domain suffix is 2 or 3 word characters.
fn valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(EMAIL.is_some());
        assert!(valid_email("ada@example.com"));
        assert!(valid_email("ada.lovelace@mail.example.org"));
        assert!(valid_email("a_b-c@x-y.io"));
        assert!(!valid_email("ada.example.com"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("ada@example"));
        assert!(!valid_email("ada@example.museum"));
        assert!(!valid_email("ada@.com"));
        assert!(!valid_email("ada @example.com"));
        assert!(!valid_email("a..b@example.com"));
        assert!(!valid_email("a.-b@example.com"));
        assert!(!valid_email("ab@ex..ample.com"));
    }

    #[test]
    fn tokens_carry_the_user() {
        let token = create_token("secret", 7, "ada").unwrap();
        let data = jsonwebtoken::decode::<Claims>(
            &token,
            &jsonwebtoken::DecodingKey::from_secret(b"secret"),
            &jsonwebtoken::Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, 7);
        assert_eq!(data.claims.handle, "ada");
    }
}
