use crate::entities::{BlogPost, BlogPostChanges, NewBlogPost};
use crate::errors::DomainError;
use crate::repositories::BlogPostRepository;
use crate::validation::CreateMode;
use serde_json::Value;
use std::sync::Arc;

pub const BLOG_POST_NOT_FOUND: &str = "Blog post not found";

/// Blog post use cases: validation in front of the repository.
pub struct BlogPostService {
    repository: Arc<dyn BlogPostRepository>,
}

impl BlogPostService {
    pub fn new(repository: Arc<dyn BlogPostRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_posts(&self) -> Result<Vec<BlogPost>, DomainError> {
        self.repository.find_all().await
    }

    pub async fn get_post(&self, id: &str) -> Result<BlogPost, DomainError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(BLOG_POST_NOT_FOUND.to_string()))
    }

    /// Create from a client payload; defaulted columns may be omitted.
    pub async fn create_post(&self, payload: &Value) -> Result<BlogPost, DomainError> {
        let input = NewBlogPost::parse(payload, CreateMode::Relaxed)?;
        self.repository.create(input).await
    }

    pub async fn update_post(&self, id: &str, payload: &Value) -> Result<BlogPost, DomainError> {
        let changes = BlogPostChanges::parse(payload)?;
        self.repository
            .update(id, changes)
            .await?
            .ok_or_else(|| DomainError::NotFound(BLOG_POST_NOT_FOUND.to_string()))
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), DomainError> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound(BLOG_POST_NOT_FOUND.to_string()))
        }
    }
}
