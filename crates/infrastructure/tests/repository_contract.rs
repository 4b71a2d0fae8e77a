//! One behavioral contract, checked against every storage backend.
//!
//! The in-memory store and the SQLite store must be indistinguishable to
//! callers, so each scenario below runs once per backend.

use std::sync::Arc;
use std::time::Duration;

use domain::{
    BlogPostChanges, BlogPostRepository, Difficulty, LearningResourceChanges,
    LearningResourceRepository, NewBlogPost, NewLearningResource, ResourceCategory, ResourceType,
    DEFAULT_BLOG_CATEGORY,
};
use infrastructure::{
    Database, InMemoryBlogPostRepository, InMemoryLearningResourceRepository,
    SqliteBlogPostRepository, SqliteLearningResourceRepository,
};
use tempfile::TempDir;

struct Backend {
    posts: Arc<dyn BlogPostRepository>,
    resources: Arc<dyn LearningResourceRepository>,
    _dir: Option<TempDir>,
}

fn memory() -> Backend {
    Backend {
        posts: Arc::new(InMemoryBlogPostRepository::new()),
        resources: Arc::new(InMemoryLearningResourceRepository::new()),
        _dir: None,
    }
}

fn sqlite() -> Backend {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("contract.db");
    let database = Database::connect(&path.to_string_lossy()).unwrap();
    let pool = database.get_pool().clone();
    Backend {
        posts: Arc::new(SqliteBlogPostRepository::new(pool.clone())),
        resources: Arc::new(SqliteLearningResourceRepository::new(pool)),
        _dir: Some(dir),
    }
}

fn worksheet(title: &str) -> NewLearningResource {
    NewLearningResource {
        title: title.to_string(),
        description: "Practice sheet".to_string(),
        file_name: format!("{}-1-2.pdf", title),
        file_size: 2048,
        file_type: "application/pdf".to_string(),
        category: ResourceCategory::Children,
        resource_type: ResourceType::Worksheet,
        difficulty: Difficulty::Easy,
        age_group: "5-7세".to_string(),
        is_active: None,
    }
}

async fn pause() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

async fn blog_post_create_applies_defaults(backend: Backend) {
    let first = backend.posts.create(NewBlogPost::new("T", "C")).await.unwrap();
    let second = backend.posts.create(NewBlogPost::new("T", "C")).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.created_at, first.updated_at);
    assert_eq!(first.category, DEFAULT_BLOG_CATEGORY);
    assert_eq!(first.tags, None);
    assert!(first.is_published);

    let stored = backend.posts.find_by_id(&first.id).await.unwrap().unwrap();
    assert_eq!(stored, first);
}

async fn blog_posts_list_newest_first(backend: Backend) {
    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        ids.push(backend.posts.create(NewBlogPost::new(title, "body")).await.unwrap().id);
        pause().await;
    }
    ids.reverse();

    let listed: Vec<String> = backend
        .posts
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, ids);
}

async fn blog_post_partial_update(backend: Backend) {
    let mut input = NewBlogPost::new("T", "C");
    input.summary = Some("short".into());
    input.tags = Some(vec!["kids".into(), "math".into()]);
    let post = backend.posts.create(input).await.unwrap();
    pause().await;

    let untouched = backend
        .posts
        .update(&post.id, BlogPostChanges::default())
        .await
        .unwrap()
        .unwrap();
    assert!(untouched.updated_at > post.updated_at);
    assert_eq!(untouched.created_at, post.created_at);
    assert_eq!(
        (&untouched.title, &untouched.summary, &untouched.tags),
        (&post.title, &post.summary, &post.tags)
    );

    let changed = backend
        .posts
        .update(
            &post.id,
            BlogPostChanges {
                title: Some("New".into()),
                summary: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(changed.title, "New");
    assert_eq!(changed.summary, None);
    assert_eq!(changed.content, "C");
    assert_eq!(changed.tags, post.tags);

    let missing = backend
        .posts
        .update("no-such-id", BlogPostChanges::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

async fn blog_post_hard_delete(backend: Backend) {
    let post = backend.posts.create(NewBlogPost::new("T", "C")).await.unwrap();

    assert!(backend.posts.delete(&post.id).await.unwrap());
    assert!(!backend.posts.delete(&post.id).await.unwrap());
    assert!(backend.posts.find_by_id(&post.id).await.unwrap().is_none());
}

async fn resource_create_defaults(backend: Backend) {
    let resource = backend.resources.create(worksheet("count")).await.unwrap();

    assert_eq!(resource.download_count, 0);
    assert!(resource.is_active);
    assert_eq!(resource.created_at, resource.updated_at);
    assert_eq!(
        backend.resources.find_by_id(&resource.id).await.unwrap(),
        Some(resource)
    );
}

async fn resource_soft_delete_hides_but_retains(backend: Backend) {
    let keep = backend.resources.create(worksheet("keep")).await.unwrap();
    let gone = backend.resources.create(worksheet("gone")).await.unwrap();
    pause().await;

    assert!(backend.resources.soft_delete(&gone.id).await.unwrap());
    assert!(!backend.resources.soft_delete(&gone.id).await.unwrap());

    assert!(backend.resources.find_by_id(&gone.id).await.unwrap().is_none());
    let listed = backend.resources.find_active().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);

    let retained = backend
        .resources
        .find_by_id_including_inactive(&gone.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!retained.is_active);
    assert!(retained.updated_at > gone.updated_at);

    let update = backend
        .resources
        .update(
            &gone.id,
            LearningResourceChanges {
                title: Some("revived?".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(update.is_none());
}

async fn resource_increment_counts_exactly(backend: Backend) {
    let resource = backend.resources.create(worksheet("count")).await.unwrap();
    for _ in 0..5 {
        backend
            .resources
            .increment_download_count(&resource.id)
            .await
            .unwrap();
    }

    let after = backend.resources.find_by_id(&resource.id).await.unwrap().unwrap();
    assert_eq!(after.download_count, 5);
    assert!(after.updated_at > resource.updated_at);

    backend
        .resources
        .increment_download_count("no-such-id")
        .await
        .unwrap();

    backend.resources.soft_delete(&resource.id).await.unwrap();
    backend
        .resources
        .increment_download_count(&resource.id)
        .await
        .unwrap();
    let retained = backend
        .resources
        .find_by_id_including_inactive(&resource.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retained.download_count, 5);
}

async fn resource_increment_is_not_lost_under_concurrency(backend: Backend) {
    let resource = backend.resources.create(worksheet("busy")).await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let repo = backend.resources.clone();
            let id = resource.id.clone();
            tokio::spawn(async move { repo.increment_download_count(&id).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let after = backend.resources.find_by_id(&resource.id).await.unwrap().unwrap();
    assert_eq!(after.download_count, 16);
}

async fn resource_update_and_ordering(backend: Backend) {
    let older = backend.resources.create(worksheet("older")).await.unwrap();
    pause().await;
    let newer = backend.resources.create(worksheet("newer")).await.unwrap();

    let listed: Vec<String> = backend
        .resources
        .find_active()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(listed, vec![newer.id.clone(), older.id.clone()]);

    let updated = backend
        .resources
        .update(
            &older.id,
            LearningResourceChanges {
                difficulty: Some(Difficulty::Hard),
                category: Some(ResourceCategory::Seniors),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.difficulty, Difficulty::Hard);
    assert_eq!(updated.category, ResourceCategory::Seniors);
    assert_eq!(updated.resource_type, ResourceType::Worksheet);
    assert_eq!(updated.download_count, 0);
}

macro_rules! contract_tests {
    ($backend:ident) => {
        mod $backend {
            #[tokio::test]
            async fn blog_post_create_applies_defaults() {
                super::blog_post_create_applies_defaults(super::$backend()).await;
            }

            #[tokio::test]
            async fn blog_posts_list_newest_first() {
                super::blog_posts_list_newest_first(super::$backend()).await;
            }

            #[tokio::test]
            async fn blog_post_partial_update() {
                super::blog_post_partial_update(super::$backend()).await;
            }

            #[tokio::test]
            async fn blog_post_hard_delete() {
                super::blog_post_hard_delete(super::$backend()).await;
            }

            #[tokio::test]
            async fn resource_create_defaults() {
                super::resource_create_defaults(super::$backend()).await;
            }

            #[tokio::test]
            async fn resource_soft_delete_hides_but_retains() {
                super::resource_soft_delete_hides_but_retains(super::$backend()).await;
            }

            #[tokio::test]
            async fn resource_increment_counts_exactly() {
                super::resource_increment_counts_exactly(super::$backend()).await;
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn resource_increment_is_not_lost_under_concurrency() {
                super::resource_increment_is_not_lost_under_concurrency(super::$backend()).await;
            }

            #[tokio::test]
            async fn resource_update_and_ordering() {
                super::resource_update_and_ordering(super::$backend()).await;
            }
        }
    };
}

contract_tests!(memory);
contract_tests!(sqlite);
