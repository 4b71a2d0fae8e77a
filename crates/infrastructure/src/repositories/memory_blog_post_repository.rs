use async_trait::async_trait;
use chrono::Utc;
use domain::{BlogPost, BlogPostChanges, BlogPostRepository, DomainError, NewBlogPost};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local blog post store. Contents vanish with the instance.
#[derive(Default)]
pub struct InMemoryBlogPostRepository {
    posts: RwLock<HashMap<String, BlogPost>>,
}

impl InMemoryBlogPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogPostRepository for InMemoryBlogPostRepository {
    async fn find_all(&self) -> Result<Vec<BlogPost>, DomainError> {
        let posts = self.posts.read().await;
        let mut all: Vec<BlogPost> = posts.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<BlogPost>, DomainError> {
        Ok(self.posts.read().await.get(id).cloned())
    }

    async fn create(&self, post: NewBlogPost) -> Result<BlogPost, DomainError> {
        let post = BlogPost::create(post, Utc::now());
        self.posts.write().await.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn update(
        &self,
        id: &str,
        changes: BlogPostChanges,
    ) -> Result<Option<BlogPost>, DomainError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(id).map(|post| {
            post.apply(changes, Utc::now());
            post.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.posts.write().await.remove(id).is_some())
    }
}
