pub mod blog_posts;
pub mod learning_resources;
pub mod system;
pub mod uploads;
