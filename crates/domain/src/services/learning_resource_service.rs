use crate::entities::{LearningResource, LearningResourceChanges, NewLearningResource, StoredFile};
use crate::errors::DomainError;
use crate::repositories::LearningResourceRepository;
use crate::services::attachment_service::AttachmentService;
use crate::validation::{CreateMode, ValidationErrors};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::fs::File;
use tracing::{debug, warn};

pub const LEARNING_RESOURCE_NOT_FOUND: &str = "Learning resource not found";

/// Metadata keys taken from the multipart `metadata` part.
const METADATA_FIELDS: &[&str] = &[
    "title",
    "description",
    "category",
    "resourceType",
    "difficulty",
    "ageGroup",
];

/// An opened attachment ready to be streamed back.
pub struct ResourceDownload {
    pub resource: LearningResource,
    pub file: File,
    pub len: u64,
}

pub struct LearningResourceService {
    repository: Arc<dyn LearningResourceRepository>,
    attachments: Arc<AttachmentService>,
}

impl LearningResourceService {
    pub fn new(
        repository: Arc<dyn LearningResourceRepository>,
        attachments: Arc<AttachmentService>,
    ) -> Self {
        Self {
            repository,
            attachments,
        }
    }

    pub async fn list_resources(&self) -> Result<Vec<LearningResource>, DomainError> {
        self.repository.find_active().await
    }

    pub async fn get_resource(&self, id: &str) -> Result<LearningResource, DomainError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(LEARNING_RESOURCE_NOT_FOUND.to_string()))
    }

    pub async fn create_resource(&self, payload: &Value) -> Result<LearningResource, DomainError> {
        let input = NewLearningResource::parse(payload, CreateMode::Relaxed)?;
        self.repository.create(input).await
    }

    pub async fn update_resource(
        &self,
        id: &str,
        payload: &Value,
    ) -> Result<LearningResource, DomainError> {
        let changes = LearningResourceChanges::parse(payload)?;
        self.repository
            .update(id, changes)
            .await?
            .ok_or_else(|| DomainError::NotFound(LEARNING_RESOURCE_NOT_FOUND.to_string()))
    }

    /// Soft delete. The attachment stays on disk.
    pub async fn delete_resource(&self, id: &str) -> Result<(), DomainError> {
        if self.repository.soft_delete(id).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound(LEARNING_RESOURCE_NOT_FOUND.to_string()))
        }
    }

    /// Count one download without touching the file.
    pub async fn record_download(&self, id: &str) -> Result<(), DomainError> {
        self.get_resource(id).await?;
        self.repository.increment_download_count(id).await
    }

    /// Resolve a resource and open its attachment.
    ///
    /// An unknown id is `NotFound`; a known id whose blob is gone is
    /// `MissingFile`. With `count` set the counter is bumped once the file is
    /// known to exist.
    pub async fn open_download(&self, id: &str, count: bool) -> Result<ResourceDownload, DomainError> {
        let resource = self.get_resource(id).await?;
        let (file, len) = self.attachments.open(&resource.file_name).await.map_err(|e| {
            if matches!(e, DomainError::MissingFile(_)) {
                warn!("Resource {} points at missing file {}", id, resource.file_name);
            }
            e
        })?;

        if count {
            self.repository.increment_download_count(id).await?;
        }

        Ok(ResourceDownload {
            resource,
            file,
            len,
        })
    }

    /// Bind an already written upload to a new resource.
    ///
    /// `metadata` is the raw JSON text of the multipart `metadata` part. On
    /// any failure the uploaded blob is removed before the error is returned.
    pub async fn create_with_file(
        &self,
        stored: &StoredFile,
        metadata: Option<&str>,
    ) -> Result<LearningResource, DomainError> {
        let result = self.create_from_parts(stored, metadata).await;
        if result.is_err() {
            debug!("Cleaning up upload {} after failed create", stored.file_name);
            self.attachments.discard(&stored.file_name).await;
        }
        result
    }

    async fn create_from_parts(
        &self,
        stored: &StoredFile,
        metadata: Option<&str>,
    ) -> Result<LearningResource, DomainError> {
        let raw = metadata.filter(|m| !m.trim().is_empty()).unwrap_or("{}");
        let metadata: Value = serde_json::from_str(raw).map_err(|e| {
            ValidationErrors::single("metadata", format!("Invalid JSON: {}", e))
        })?;
        let metadata = match metadata {
            Value::Object(map) => map,
            _ => {
                return Err(ValidationErrors::single("metadata", "Expected object").into());
            }
        };

        let payload = Self::merge_upload(&metadata, stored);
        let input = NewLearningResource::parse(&payload, CreateMode::Relaxed)?;
        self.repository.create(input).await
    }

    fn merge_upload(metadata: &Map<String, Value>, stored: &StoredFile) -> Value {
        let mut payload = Map::new();
        for key in METADATA_FIELDS {
            if let Some(value) = metadata.get(*key) {
                payload.insert((*key).to_string(), value.clone());
            }
        }
        payload.insert("fileName".into(), json!(stored.file_name));
        payload.insert("fileSize".into(), json!(stored.file_size));
        payload.insert("fileType".into(), json!(stored.file_type));
        let is_active = match metadata.get("isActive") {
            None | Some(Value::Null) => json!(true),
            Some(other) => other.clone(),
        };
        payload.insert("isActive".into(), is_active);
        Value::Object(payload)
    }
}
