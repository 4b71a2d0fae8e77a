use crate::error::ApiError;
use crate::AppState;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::{DomainError, LearningResource, ResourceDownload};
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

pub async fn list_resources(
    State(state): State<AppState>,
) -> Result<Json<Vec<LearningResource>>, ApiError> {
    Ok(Json(
        state.app.learning_resource_service.list_resources().await?,
    ))
}

pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LearningResource>, ApiError> {
    Ok(Json(
        state.app.learning_resource_service.get_resource(&id).await?,
    ))
}

pub async fn create_resource(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<LearningResource>), ApiError> {
    let Json(payload) = payload?;
    let resource = state
        .app
        .learning_resource_service
        .create_resource(&payload)
        .await?;
    info!("Created learning resource {}", resource.id);
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LearningResource>, ApiError> {
    let Json(payload) = payload?;
    Ok(Json(
        state
            .app
            .learning_resource_service
            .update_resource(&id, &payload)
            .await?,
    ))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .app
        .learning_resource_service
        .delete_resource(&id)
        .await?;
    info!("Deactivated learning resource {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Streams the attachment and counts the download.
pub async fn download_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let download = state
        .app
        .learning_resource_service
        .open_download(&id, true)
        .await?;
    file_response(download)
}

/// Streams the attachment without touching the counter.
pub async fn resource_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let download = state
        .app
        .learning_resource_service
        .open_download(&id, false)
        .await?;
    file_response(download)
}

pub async fn record_download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .app
        .learning_resource_service
        .record_download(&id)
        .await?;
    Ok(Json(json!({ "message": "Download count incremented" })))
}

fn file_response(download: ResourceDownload) -> Result<Response, ApiError> {
    let ResourceDownload {
        resource,
        file,
        len,
    } = download;
    debug!("Streaming {} ({} bytes)", resource.file_name, len);

    let header_value = |name: &str, value: String| {
        HeaderValue::try_from(value).map_err(|e| {
            DomainError::Repository(format!(
                "Resource {} has an unusable {} header: {}",
                resource.id, name, e
            ))
        })
    };
    let headers = [
        (
            header::CONTENT_TYPE,
            header_value("Content-Type", resource.file_type.clone())?,
        ),
        (
            header::CONTENT_DISPOSITION,
            header_value(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", resource.file_name),
            )?,
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(len)),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
