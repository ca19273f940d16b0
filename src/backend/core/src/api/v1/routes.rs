//! V1 API routes.
//!
//! This module defines all V1 API routes and their handlers.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::api::{handlers, AppState};

/// V1 API prefix.
pub const V1_PREFIX: &str = "/api/v1";

/// Build the V1 API router.
///
/// All routes are mounted under `/api/v1/`.
///
/// # Endpoints
///
/// ## Auth
/// - `POST /api/v1/auth/register` - Register with credentials
/// - `POST /api/v1/auth/login` - Log in with credentials
/// - `POST /api/v1/auth/oauth-login` - Find-or-create login via OAuth identity
///
/// ## Users
/// - `GET /api/v1/users/me` - Current authenticated user
/// - `POST /api/v1/users/complete-profile` - One-time profile completion
///
/// ## Blogs
/// - `POST /api/v1/blogs` - Create a blog post
/// - `GET /api/v1/blogs/:id` - Fetch a blog (counts a first view when authenticated)
/// - `DELETE /api/v1/blogs/:id` - Delete own blog
/// - `POST /api/v1/blogs/:id/like` - Like a blog (once per user)
/// - `POST /api/v1/blogs/:id/comments` - Comment on a blog
///
/// ## AI
/// - `POST /api/v1/ai/generate-title` - Title suggestions from keywords
/// - `POST /api/v1/ai/enhance-content` - Rewrite content for readability
/// - `POST /api/v1/ai/summarize` - Summarize content
pub fn v1_router() -> Router<AppState> {
    Router::new()
        // Auth endpoints
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/oauth-login", post(handlers::oauth_login))
        // User endpoints
        .route("/users/me", get(handlers::current_user))
        .route("/users/complete-profile", post(handlers::complete_profile))
        // Blog endpoints
        .route("/blogs", post(handlers::create_blog))
        .route("/blogs/:id", get(handlers::get_blog))
        .route("/blogs/:id", delete(handlers::delete_blog))
        .route("/blogs/:id/like", post(handlers::like_blog))
        .route("/blogs/:id/comments", post(handlers::comment_blog))
        // AI endpoints
        .route("/ai/generate-title", post(handlers::generate_title))
        .route("/ai/enhance-content", post(handlers::enhance_content))
        .route("/ai/summarize", post(handlers::summarize))
}

/// V1 API route constants for use in clients and documentation.
pub mod paths {
    // Auth routes
    pub const REGISTER: &str = "/api/v1/auth/register";
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const OAUTH_LOGIN: &str = "/api/v1/auth/oauth-login";

    // User routes
    pub const ME: &str = "/api/v1/users/me";
    pub const COMPLETE_PROFILE: &str = "/api/v1/users/complete-profile";

    // Blog routes
    pub const BLOGS: &str = "/api/v1/blogs";
    pub const BLOG: &str = "/api/v1/blogs/:id";
    pub const BLOG_LIKE: &str = "/api/v1/blogs/:id/like";
    pub const BLOG_COMMENTS: &str = "/api/v1/blogs/:id/comments";

    // AI routes
    pub const AI_GENERATE_TITLE: &str = "/api/v1/ai/generate-title";
    pub const AI_ENHANCE_CONTENT: &str = "/api/v1/ai/enhance-content";
    pub const AI_SUMMARIZE: &str = "/api/v1/ai/summarize";
}
