use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse},
    extractors::AuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::User,
};
use crate::{
    error::{ApiError, AppJson},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.normalize();
    payload.validate()?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::registration_conflict());
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.email,
        &hash,
        &payload.first_name,
        &payload.last_name,
    )
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                // Lost the race against a concurrent registration.
                return ApiError::registration_conflict();
            }
        }
        anyhow::Error::from(e).into()
    })?;

    let keys = JwtKeys::from_ref(&state);
    let (token, expires_at) = keys.sign(user.id)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        token,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        expires_at,
    }))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    // Unknown email, inactive account and wrong password all answer with the
    // same body; only the log line says which it was.
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(user) if user.is_active => user,
        _ => {
            warn!(email = %email, "login with unknown or inactive account");
            return Err(ApiError::invalid_credentials());
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::invalid_credentials());
    }

    let keys = JwtKeys::from_ref(&state);
    let (token, expires_at) = keys.sign(user.id)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        expires_at,
    }))
}

#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User with id {user_id} was not found.")))?;
    Ok(Json(UserResponse::from(user)))
}
