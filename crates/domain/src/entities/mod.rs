pub mod blog_post;
pub mod learning_resource;
pub mod stored_file;

pub use blog_post::*;
pub use learning_resource::*;
pub use stored_file::*;
