use crate::entities::{LearningResource, LearningResourceChanges, NewLearningResource};
use crate::errors::DomainError;
use async_trait::async_trait;

/// Persistence port for learning resources.
///
/// Inactive (soft-deleted) rows are invisible to every method except
/// [`find_by_id_including_inactive`](Self::find_by_id_including_inactive).
#[async_trait]
pub trait LearningResourceRepository: Send + Sync {
    /// Active resources, `created_at` descending.
    async fn find_active(&self) -> Result<Vec<LearningResource>, DomainError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<LearningResource>, DomainError>;
    async fn find_by_id_including_inactive(
        &self,
        id: &str,
    ) -> Result<Option<LearningResource>, DomainError>;
    async fn create(&self, resource: NewLearningResource)
        -> Result<LearningResource, DomainError>;
    async fn update(
        &self,
        id: &str,
        changes: LearningResourceChanges,
    ) -> Result<Option<LearningResource>, DomainError>;
    /// Flips `is_active` off. Returns whether an active row was found.
    async fn soft_delete(&self, id: &str) -> Result<bool, DomainError>;
    /// Adds exactly one to `download_count`; a no-op for missing or inactive ids.
    /// Must not lose increments under concurrent callers.
    async fn increment_download_count(&self, id: &str) -> Result<(), DomainError>;
}
