use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domain::BlogPost;
use serde_json::Value;
use tracing::info;

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, ApiError> {
    Ok(Json(state.app.blog_post_service.list_posts().await?))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(state.app.blog_post_service.get_post(&id).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    let Json(payload) = payload?;
    let post = state.app.blog_post_service.create_post(&payload).await?;
    info!("Created blog post {}", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BlogPost>, ApiError> {
    let Json(payload) = payload?;
    Ok(Json(
        state.app.blog_post_service.update_post(&id, &payload).await?,
    ))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.app.blog_post_service.delete_post(&id).await?;
    info!("Deleted blog post {}", id);
    Ok(StatusCode::NO_CONTENT)
}
