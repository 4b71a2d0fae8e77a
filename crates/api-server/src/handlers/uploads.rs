use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use domain::{AttachmentService, LearningResource, StoredFile};
use serde_json::{json, Value};
use tracing::{info, warn};

pub const NO_FILE_UPLOADED: &str = "No file uploaded";

/// A file part held in memory until every check has passed.
struct PendingFile {
    original_name: String,
    content_type: Option<String>,
    content: Vec<u8>,
}

#[derive(Default)]
struct UploadParts {
    file: Option<PendingFile>,
    metadata: Option<String>,
}

/// Drain the multipart body, rejecting the `file` part as soon as its
/// extension or accumulated size is out of bounds.
async fn read_upload(
    mut multipart: Multipart,
    attachments: &AttachmentService,
) -> Result<UploadParts, ApiError> {
    let mut parts = UploadParts::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let original_name = match field.file_name() {
                    Some(file_name) if !file_name.is_empty() => file_name.to_string(),
                    _ => continue,
                };
                let content_type = field.content_type().map(str::to_string);

                if let Err(e) = attachments.check_file_name(&original_name) {
                    warn!("Rejected upload {}: {}", original_name, e);
                    return Err(e.into());
                }

                let mut content = Vec::new();
                while let Some(chunk) = field.chunk().await? {
                    if let Err(e) = attachments.check_size(content.len() + chunk.len()) {
                        warn!("Rejected upload {}: {}", original_name, e);
                        return Err(e.into());
                    }
                    content.extend_from_slice(&chunk);
                }

                parts.file = Some(PendingFile {
                    original_name,
                    content_type,
                    content,
                });
            }
            "metadata" => parts.metadata = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(parts)
}

async fn store_upload(state: &AppState, file: Option<PendingFile>) -> Result<StoredFile, ApiError> {
    let file = file.ok_or_else(|| ApiError::BadRequest(NO_FILE_UPLOADED.to_string()))?;
    let stored = state
        .app
        .attachments
        .store(
            &file.original_name,
            file.content_type.as_deref(),
            &file.content,
        )
        .await?;
    info!(
        "Uploaded {} as {} ({} bytes)",
        stored.original_name, stored.file_name, stored.file_size
    );
    Ok(stored)
}

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let parts = read_upload(multipart, &state.app.attachments).await?;
    let stored = store_upload(&state, parts.file).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "File uploaded successfully",
            "file": stored,
        })),
    ))
}

pub async fn create_resource_with_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<LearningResource>), ApiError> {
    let parts = read_upload(multipart, &state.app.attachments).await?;
    let stored = store_upload(&state, parts.file).await?;

    let resource = state
        .app
        .learning_resource_service
        .create_with_file(&stored, parts.metadata.as_deref())
        .await?;
    info!(
        "Created learning resource {} with file {}",
        resource.id, resource.file_name
    );
    Ok((StatusCode::CREATED, Json(resource)))
}
