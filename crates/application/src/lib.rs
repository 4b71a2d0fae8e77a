use domain::*;
use infrastructure::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Portfolio application - the context object handed to the HTTP layer.
///
/// Built once at startup against either storage backend; nothing in here
/// is process-global, so tests can run side by side with their own state.
pub struct PortfolioApp {
    pub blog_post_service: BlogPostService,
    pub learning_resource_service: LearningResourceService,
    pub attachments: Arc<AttachmentService>,
    learning_resources: Arc<dyn LearningResourceRepository>,
    backend: &'static str,
}

impl PortfolioApp {
    /// Persistent backend: SQLite at `database_url`.
    pub fn new_with_database(
        database_url: &str,
        upload_dir: impl Into<PathBuf>,
    ) -> Result<Self, DomainError> {
        // Infrastructure layer - database setup
        let database = Database::connect(database_url)?;
        let pool = database.get_pool().clone();

        let blog_posts: Arc<dyn BlogPostRepository> =
            Arc::new(SqliteBlogPostRepository::new(pool.clone()));
        let learning_resources: Arc<dyn LearningResourceRepository> =
            Arc::new(SqliteLearningResourceRepository::new(pool));

        Ok(Self::from_repositories(
            blog_posts,
            learning_resources,
            AttachmentService::new(upload_dir),
            "sqlite",
        ))
    }

    /// Ephemeral backend: everything lives in process memory.
    pub fn in_memory(upload_dir: impl Into<PathBuf>) -> Self {
        Self::from_repositories(
            Arc::new(InMemoryBlogPostRepository::new()),
            Arc::new(InMemoryLearningResourceRepository::new()),
            AttachmentService::new(upload_dir),
            "memory",
        )
    }

    pub fn from_repositories(
        blog_posts: Arc<dyn BlogPostRepository>,
        learning_resources: Arc<dyn LearningResourceRepository>,
        attachments: AttachmentService,
        backend: &'static str,
    ) -> Self {
        let attachments = Arc::new(attachments);
        info!(
            "Portfolio app using {} storage, uploads in {}",
            backend,
            attachments.upload_dir().display()
        );

        Self {
            blog_post_service: BlogPostService::new(blog_posts),
            learning_resource_service: LearningResourceService::new(
                learning_resources.clone(),
                attachments.clone(),
            ),
            attachments,
            learning_resources,
            backend,
        }
    }

    /// Create the upload directory if it is missing.
    pub async fn prepare(&self) -> Result<(), DomainError> {
        self.attachments.ensure_upload_dir().await
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Raw repository access, including soft-deleted rows.
    pub fn learning_resource_repository(&self) -> Arc<dyn LearningResourceRepository> {
        self.learning_resources.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn app() -> (PortfolioApp, TempDir) {
        let dir = TempDir::new().unwrap();
        (PortfolioApp::in_memory(dir.path().join("uploads")), dir)
    }

    fn metadata() -> String {
        json!({
            "title": "그림 카드",
            "description": "Picture cards",
            "category": "어르신용",
            "resourceType": "안내서",
            "difficulty": "보통",
            "ageGroup": "60+"
        })
        .to_string()
    }

    #[tokio::test]
    async fn create_with_file_binds_upload_metadata() {
        let (app, _dir) = app();
        let stored = app.attachments.store("cards.png", None, b"png").await.unwrap();

        let resource = app
            .learning_resource_service
            .create_with_file(&stored, Some(&metadata()))
            .await
            .unwrap();

        assert_eq!(resource.file_name, stored.file_name);
        assert_eq!(resource.file_size, 3);
        assert_eq!(resource.file_type, "image/png");
        assert!(resource.is_active);
        assert!(app.attachments.exists(&stored.file_name).await);
    }

    #[tokio::test]
    async fn create_with_file_removes_upload_on_validation_failure() {
        let (app, _dir) = app();
        let stored = app.attachments.store("cards.png", None, b"png").await.unwrap();
        let bad = metadata().replace("어르신용", "toddlers");

        let err = app
            .learning_resource_service
            .create_with_file(&stored, Some(&bad))
            .await
            .unwrap_err();

        match err {
            DomainError::Validation(errors) => assert!(errors.has_path("category")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!app.attachments.exists(&stored.file_name).await);
    }

    #[tokio::test]
    async fn create_with_file_rejects_malformed_metadata() {
        let (app, _dir) = app();
        let stored = app.attachments.store("cards.png", None, b"png").await.unwrap();

        let err = app
            .learning_resource_service
            .create_with_file(&stored, Some("{not json"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(ref e) if e.has_path("metadata")));
        assert!(!app.attachments.exists(&stored.file_name).await);
    }

    #[tokio::test]
    async fn download_distinguishes_unknown_id_from_missing_blob() {
        let (app, _dir) = app();
        let service = &app.learning_resource_service;

        let unknown = service.open_download("nope", true).await.err().unwrap();
        assert!(matches!(unknown, DomainError::NotFound(_)));

        let stored = app.attachments.store("cards.png", None, b"png").await.unwrap();
        let resource = service.create_with_file(&stored, Some(&metadata())).await.unwrap();
        app.attachments.remove(&stored.file_name).await.unwrap();

        let missing = service.open_download(&resource.id, true).await.err().unwrap();
        assert!(matches!(missing, DomainError::MissingFile(_)));
        assert_eq!(service.get_resource(&resource.id).await.unwrap().download_count, 0);
    }

    #[tokio::test]
    async fn counted_and_uncounted_downloads() {
        let (app, _dir) = app();
        let service = &app.learning_resource_service;
        let stored = app.attachments.store("cards.png", None, b"png").await.unwrap();
        let resource = service.create_with_file(&stored, Some(&metadata())).await.unwrap();

        let download = service.open_download(&resource.id, false).await.unwrap();
        assert_eq!(download.len, 3);
        service.open_download(&resource.id, true).await.unwrap();
        service.record_download(&resource.id).await.unwrap();

        assert_eq!(service.get_resource(&resource.id).await.unwrap().download_count, 2);
    }

    #[tokio::test]
    async fn soft_delete_keeps_record_and_file() {
        let (app, _dir) = app();
        let service = &app.learning_resource_service;
        let stored = app.attachments.store("cards.png", None, b"png").await.unwrap();
        let resource = service.create_with_file(&stored, Some(&metadata())).await.unwrap();

        service.delete_resource(&resource.id).await.unwrap();
        assert!(matches!(
            service.delete_resource(&resource.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.record_download(&resource.id).await,
            Err(DomainError::NotFound(_))
        ));

        let retained = app
            .learning_resource_repository()
            .find_by_id_including_inactive(&resource.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!retained.is_active);
        assert!(app.attachments.exists(&stored.file_name).await);
    }

    #[tokio::test]
    async fn blog_post_service_maps_absence_to_not_found() {
        let (app, _dir) = app();
        let service = &app.blog_post_service;

        let post = service
            .create_post(&json!({"title": "T", "content": "C"}))
            .await
            .unwrap();
        service.delete_post(&post.id).await.unwrap();

        assert!(matches!(service.get_post(&post.id).await, Err(DomainError::NotFound(_))));
        assert!(matches!(
            service.update_post(&post.id, &json!({})).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(service.delete_post(&post.id).await, Err(DomainError::NotFound(_))));
    }
}
