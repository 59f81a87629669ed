use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{dto::ProfileRequest, repo::UserProfile};
use crate::{
    error::{ApiError, AppJson},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/userprofiles", get(list).post(create))
        .route(
            "/userprofiles/:id",
            get(get_by_id).put(update).delete(remove),
        )
}

fn profile_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("User profile with id {id} was not found."))
}

#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let profiles = UserProfile::list(&state.db).await?;
    Ok(Json(profiles))
}

#[instrument(skip(state))]
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = UserProfile::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| profile_not_found(id))?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
async fn create(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProfileRequest>,
) -> Result<(StatusCode, HeaderMap, Json<UserProfile>), ApiError> {
    payload.validate()?;

    let profile = UserProfile::create(
        &state.db,
        &payload.first_name,
        &payload.last_name,
        &payload.email,
        payload.birth_date,
    )
    .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        format!("/api/userprofiles/{}", profile.id).parse().unwrap(),
    );

    info!(profile_id = profile.id, "user profile created");
    Ok((StatusCode::CREATED, headers, Json(profile)))
}

#[instrument(skip(state, payload))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<ProfileRequest>,
) -> Result<StatusCode, ApiError> {
    payload.validate()?;

    let updated = UserProfile::update(
        &state.db,
        id,
        &payload.first_name,
        &payload.last_name,
        &payload.email,
        payload.birth_date,
    )
    .await?;
    if !updated {
        return Err(profile_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = UserProfile::delete(&state.db, id).await?;
    if !deleted {
        return Err(profile_not_found(id));
    }
    info!(profile_id = id, "user profile deleted");
    Ok(StatusCode::NO_CONTENT)
}
