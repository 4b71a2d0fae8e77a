pub mod error;
pub mod handlers;

use application::PortfolioApp;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use handlers::{blog_posts, learning_resources, system, uploads};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Slack for multipart framing and the metadata part.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<PortfolioApp>,
}

/// (method, path, description) for every mounted route.
pub const ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/api/blog-posts", "List blog posts"),
    ("POST", "/api/blog-posts", "Create blog post"),
    ("GET", "/api/blog-posts/:id", "Get blog post"),
    ("PATCH", "/api/blog-posts/:id", "Update blog post"),
    ("DELETE", "/api/blog-posts/:id", "Delete blog post"),
    ("GET", "/api/learning-resources", "List active learning resources"),
    ("POST", "/api/learning-resources", "Create learning resource"),
    ("POST", "/api/learning-resources/with-file", "Upload file and create resource"),
    ("GET", "/api/learning-resources/:id", "Get learning resource"),
    ("PATCH", "/api/learning-resources/:id", "Update learning resource"),
    ("DELETE", "/api/learning-resources/:id", "Deactivate learning resource"),
    ("GET", "/api/learning-resources/:id/download", "Download file (counted)"),
    ("GET", "/api/learning-resources/:id/file", "Fetch file (not counted)"),
    ("POST", "/api/learning-resources/:id/download", "Count a download"),
    ("POST", "/api/learning-resources/:id/increment-download", "Count a download"),
    ("POST", "/api/upload", "Upload file"),
    ("GET", "/api/status", "System status"),
    ("GET", "/health", "Health check"),
];

pub fn router(app: Arc<PortfolioApp>) -> Router {
    // Raised above the upload ceiling so oversize files reach the size check
    let upload_limit = DefaultBodyLimit::max(app.attachments.max_bytes() * 2 + MULTIPART_OVERHEAD);
    let state = AppState { app };

    Router::new()
        .route(
            "/api/blog-posts",
            get(blog_posts::list_posts).post(blog_posts::create_post),
        )
        .route(
            "/api/blog-posts/:id",
            get(blog_posts::get_post)
                .patch(blog_posts::update_post)
                .delete(blog_posts::delete_post),
        )
        .route(
            "/api/learning-resources",
            get(learning_resources::list_resources).post(learning_resources::create_resource),
        )
        .route(
            "/api/learning-resources/with-file",
            post(uploads::create_resource_with_file).layer(upload_limit),
        )
        .route(
            "/api/learning-resources/:id",
            get(learning_resources::get_resource)
                .patch(learning_resources::update_resource)
                .delete(learning_resources::delete_resource),
        )
        .route(
            "/api/learning-resources/:id/download",
            get(learning_resources::download_resource).post(learning_resources::record_download),
        )
        .route(
            "/api/learning-resources/:id/increment-download",
            post(learning_resources::record_download),
        )
        .route(
            "/api/learning-resources/:id/file",
            get(learning_resources::resource_file),
        )
        .route("/api/upload", post(uploads::upload_file).layer(upload_limit))
        .route("/api/status", get(system::system_status))
        .route("/health", get(system::health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
