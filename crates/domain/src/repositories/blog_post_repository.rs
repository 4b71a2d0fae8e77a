use crate::entities::{BlogPost, BlogPostChanges, NewBlogPost};
use crate::errors::DomainError;
use async_trait::async_trait;

/// Persistence port for blog posts.
///
/// Implementations must be indistinguishable to callers: newest-first
/// listing, `None` for unknown ids, and physical removal on delete.
#[async_trait]
pub trait BlogPostRepository: Send + Sync {
    /// All posts, `created_at` descending.
    async fn find_all(&self) -> Result<Vec<BlogPost>, DomainError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<BlogPost>, DomainError>;
    async fn create(&self, post: NewBlogPost) -> Result<BlogPost, DomainError>;
    /// Applies only the supplied fields and bumps `updated_at`.
    async fn update(&self, id: &str, changes: BlogPostChanges)
        -> Result<Option<BlogPost>, DomainError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
}
