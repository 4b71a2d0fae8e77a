pub mod blog_post_repository;
pub mod learning_resource_repository;

pub use blog_post_repository::BlogPostRepository;
pub use learning_resource_repository::LearningResourceRepository;
