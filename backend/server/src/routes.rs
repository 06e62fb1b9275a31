use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use bank::models::{
    FoodPostUpdate, NewCategory, NewFoodPost, NewMessage, NewReview, NewUser, UserUpdate,
};
use serde_json::json;

use crate::{
    error::AppError,
    extract::{AdminUser, CurrentUser},
    search::SearchParams,
    state::AppState,
    utils::{
        read_json, read_path, validate_message, validate_new_category, validate_new_post,
        validate_new_user, validate_post_update,
    },
};

pub async fn home_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Food Sharing API is running!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new_user = read_json(payload)?;
    validate_new_user(&new_user)?;

    let user = state.database.create_user(new_user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn me_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(user)
}

pub async fn update_me_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let update = read_json(payload)?;

    Ok(Json(state.database.update_user(user.id, update).await?))
}

pub async fn categories_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.database.categories().await?))
}

pub async fn create_category_handler(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let category = read_json(payload)?;
    validate_new_category(&category)?;

    let created = state.database.create_category(category).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

    Ok(Json(state.database.search_posts(params.into()).await?))
}

pub async fn create_post_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<NewFoodPost>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new_post = read_json(payload)?;
    validate_new_post(&new_post)?;

    let post = state.database.create_post(user.id, new_post).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn post_handler(
    State(state): State<Arc<AppState>>,
    post_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = read_path(post_id)?;

    Ok(Json(state.database.post(post_id).await?))
}

pub async fn update_post_handler(
    State(state): State<Arc<AppState>>,
    post_id: Result<Path<i64>, PathRejection>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<FoodPostUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = read_path(post_id)?;
    let update = read_json(payload)?;
    validate_post_update(&update)?;

    Ok(Json(
        state.database.update_post(post_id, user.id, update).await?,
    ))
}

pub async fn delete_post_handler(
    State(state): State<Arc<AppState>>,
    post_id: Result<Path<i64>, PathRejection>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let post_id = read_path(post_id)?;
    state.database.delete_post(post_id, user.id).await?;

    Ok(Json(json!({ "message": "Food post deleted successfully" })))
}

pub async fn claim_handler(
    State(state): State<Arc<AppState>>,
    post_id: Result<Path<i64>, PathRejection>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let post_id = read_path(post_id)?;
    let post = state.database.claim_post(post_id, user.id).await?;

    Ok(Json(json!({
        "message": "Food post claimed successfully",
        "post": post,
    })))
}

pub async fn messages_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.database.messages_for(user.id).await?))
}

pub async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let message = read_json(payload)?;
    validate_message(&message)?;

    let sent = state.database.send_message(user.id, message).await?;

    Ok((StatusCode::CREATED, Json(sent)))
}

pub async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let review = read_json(payload)?;

    let created = state.database.create_review(user.id, review).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn reviews_handler(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = read_path(user_id)?;

    Ok(Json(state.database.reviews_for(user_id).await?))
}
