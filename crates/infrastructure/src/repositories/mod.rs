pub mod memory_blog_post_repository;
pub mod memory_learning_resource_repository;
pub mod sqlite_blog_post_repository;
pub mod sqlite_learning_resource_repository;

pub use memory_blog_post_repository::InMemoryBlogPostRepository;
pub use memory_learning_resource_repository::InMemoryLearningResourceRepository;
pub use sqlite_blog_post_repository::SqliteBlogPostRepository;
pub use sqlite_learning_resource_repository::SqliteLearningResourceRepository;
