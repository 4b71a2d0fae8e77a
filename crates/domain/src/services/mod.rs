pub mod attachment_service;
pub mod blog_post_service;
pub mod learning_resource_service;

pub use attachment_service::AttachmentService;
pub use blog_post_service::BlogPostService;
pub use learning_resource_service::{LearningResourceService, ResourceDownload};
