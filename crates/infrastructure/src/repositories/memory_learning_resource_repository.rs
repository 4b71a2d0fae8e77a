use async_trait::async_trait;
use chrono::Utc;
use domain::{
    DomainError, LearningResource, LearningResourceChanges, LearningResourceRepository,
    NewLearningResource,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local resource store. Soft-deleted rows stay in the map.
#[derive(Default)]
pub struct InMemoryLearningResourceRepository {
    resources: RwLock<HashMap<String, LearningResource>>,
}

impl InMemoryLearningResourceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LearningResourceRepository for InMemoryLearningResourceRepository {
    async fn find_active(&self) -> Result<Vec<LearningResource>, DomainError> {
        let resources = self.resources.read().await;
        let mut active: Vec<LearningResource> =
            resources.values().filter(|r| r.is_active).cloned().collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<LearningResource>, DomainError> {
        let resources = self.resources.read().await;
        Ok(resources.get(id).filter(|r| r.is_active).cloned())
    }

    async fn find_by_id_including_inactive(
        &self,
        id: &str,
    ) -> Result<Option<LearningResource>, DomainError> {
        Ok(self.resources.read().await.get(id).cloned())
    }

    async fn create(&self, resource: NewLearningResource) -> Result<LearningResource, DomainError> {
        let resource = LearningResource::create(resource, Utc::now());
        self.resources
            .write()
            .await
            .insert(resource.id.clone(), resource.clone());
        Ok(resource)
    }

    async fn update(
        &self,
        id: &str,
        changes: LearningResourceChanges,
    ) -> Result<Option<LearningResource>, DomainError> {
        let mut resources = self.resources.write().await;
        Ok(resources
            .get_mut(id)
            .filter(|r| r.is_active)
            .map(|resource| {
                resource.apply(changes, Utc::now());
                resource.clone()
            }))
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut resources = self.resources.write().await;
        match resources.get_mut(id).filter(|r| r.is_active) {
            Some(resource) => {
                resource.is_active = false;
                resource.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment_download_count(&self, id: &str) -> Result<(), DomainError> {
        // The write guard makes read-modify-write atomic
        let mut resources = self.resources.write().await;
        if let Some(resource) = resources.get_mut(id).filter(|r| r.is_active) {
            resource.download_count += 1;
            resource.updated_at = Utc::now();
        }
        Ok(())
    }
}
