use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{TodoRequest, TodoResponse},
    repo::TodoItem,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, AppJson},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todo", get(list).post(create))
        .route("/todo/:id", get(get_by_id).put(update).delete(remove))
}

/// Foreign items answer exactly like missing ones.
fn todo_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Todo item with id {id} was not found."))
}

#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    let items = TodoItem::list_by_user(&state.db, user_id).await?;
    Ok(Json(items.into_iter().map(TodoResponse::from).collect()))
}

#[instrument(skip(state))]
async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, ApiError> {
    let item = TodoItem::find_owned(&state.db, user_id, id)
        .await?
        .ok_or_else(|| todo_not_found(id))?;
    Ok(Json(item.into()))
}

#[instrument(skip(state, payload))]
async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<TodoRequest>,
) -> Result<(StatusCode, HeaderMap, Json<TodoResponse>), ApiError> {
    payload.validate()?;

    let item = TodoItem::create(&state.db, user_id, &payload.title, payload.is_done).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        format!("/api/todo/{}", item.id).parse().unwrap(),
    );

    info!(user_id, todo_id = item.id, "todo created");
    Ok((StatusCode::CREATED, headers, Json(item.into())))
}

#[instrument(skip(state, payload))]
async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<TodoRequest>,
) -> Result<StatusCode, ApiError> {
    payload.validate()?;

    let updated =
        TodoItem::update_owned(&state.db, user_id, id, &payload.title, payload.is_done).await?;
    if !updated {
        return Err(todo_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = TodoItem::delete_owned(&state.db, user_id, id).await?;
    if !deleted {
        return Err(todo_not_found(id));
    }
    info!(user_id, todo_id = id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}
