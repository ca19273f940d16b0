//! API request handlers with proper error propagation.
//!
//! All handlers return `Result<impl IntoResponse, QuillError>` so that errors
//! are automatically converted to appropriate HTTP status codes via the
//! `IntoResponse` implementation on `QuillError`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiResponse, AppState};
use crate::auth::{password, AuthUser, MaybeAuthUser};
use crate::blog::NewPost;
use crate::db::UserRow;
use crate::error::{ErrorCode, QuillError};
use crate::observability;
use crate::users::{NewUser, ProfileUpdate, SocialLinks};

// ═══════════════════════════════════════════════════════════════════════════════
// Health & Metrics
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn prometheus_metrics() -> impl IntoResponse {
    observability::render_metrics()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Auth Handlers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct OauthLoginRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserRow,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, QuillError> {
    let new_user = NewUser::validate(
        &req.username,
        &req.email,
        req.password.as_deref(),
        false,
        &req.first_name,
        &req.last_name,
    )?;

    let password_hash = new_user
        .password
        .as_deref()
        .map(password::hash)
        .transpose()?;

    let user = state.db.insert_user(&new_user, password_hash).await?;
    let token = state.tokens.issue(user.id, &user.username)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AuthResponse { token, user })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, QuillError> {
    let email = req.email.trim().to_lowercase();

    let user = state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    // OAuth accounts have no password; they must use the OAuth flow.
    let digest = user
        .password_hash
        .as_deref()
        .ok_or_else(invalid_credentials)?;

    if !password::verify(&req.password, digest)? {
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(user.id, &user.username)?;
    Ok(Json(ApiResponse::success(AuthResponse { token, user })))
}

/// Find-or-create login for users arriving from an OAuth provider.
pub async fn oauth_login(
    State(state): State<AppState>,
    Json(req): Json<OauthLoginRequest>,
) -> Result<impl IntoResponse, QuillError> {
    let email = req.email.trim().to_lowercase();

    let user = match state.db.find_user_by_email(&email).await? {
        Some(existing) => existing,
        None => {
            let new_user = NewUser::validate(
                &req.username,
                &req.email,
                None,
                true,
                &req.first_name,
                &req.last_name,
            )?;
            let created = state.db.insert_user(&new_user, None).await?;
            tracing::info!(user_id = %created.id, "OAuth user registered");
            created
        }
    };

    let token = state.tokens.issue(user.id, &user.username)?;
    Ok(Json(ApiResponse::success(AuthResponse { token, user })))
}

fn invalid_credentials() -> QuillError {
    QuillError::new(ErrorCode::InvalidCredentials, "Invalid email or password")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Profile Handlers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub struct CompleteProfileRequest {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<SocialLinks>,
}

pub async fn complete_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CompleteProfileRequest>,
) -> Result<impl IntoResponse, QuillError> {
    let user_id = claims.user_id()?;

    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| QuillError::user_not_found(user_id))?;

    if user.profile_completed {
        return Err(QuillError::new(
            ErrorCode::ProfileAlreadyCompleted,
            "Profile has already been completed",
        ));
    }

    let update = ProfileUpdate::validate(req.bio, req.website, req.social_links)?;
    let user = state.db.complete_profile(user_id, &update).await?;

    Ok(Json(ApiResponse::success(user)))
}

pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, QuillError> {
    let user_id = claims.user_id()?;
    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| QuillError::user_not_found(user_id))?;

    Ok(Json(ApiResponse::success(user)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Blog Handlers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub message: String,
}

pub async fn create_blog(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateBlogRequest>,
) -> Result<impl IntoResponse, QuillError> {
    let author = claims.user_id()?;
    let post = NewPost::validate(&req.title, &req.content, author, req.cover_image, req.tags)?;

    let blog = state.engagement.create_post(post).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(blog))))
}

pub async fn get_blog(
    State(state): State<AppState>,
    MaybeAuthUser(claims): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, QuillError> {
    let viewer = claims.map(|c| c.user_id()).transpose()?;
    let blog = state.engagement.view_post(id, viewer).await?;

    Ok(Json(ApiResponse::success(blog)))
}

pub async fn like_blog(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, QuillError> {
    let outcome = state.engagement.like_post(id, claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn comment_blog(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, QuillError> {
    let comments = state
        .engagement
        .comment_on_post(id, claims.user_id()?, &req.message)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(comments))))
}

pub async fn delete_blog(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, QuillError> {
    state.engagement.delete_post(id, claims.user_id()?).await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "id": id,
        "deleted": true
    }))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Generative-AI Handlers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub struct GenerateTitleRequest {
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Serialize)]
pub struct AiTextResponse {
    pub text: String,
}

pub async fn generate_title(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Json(req): Json<GenerateTitleRequest>,
) -> Result<impl IntoResponse, QuillError> {
    let text = state.ai.generate_title(&req.keywords).await?;
    Ok(Json(ApiResponse::success(AiTextResponse { text })))
}

pub async fn enhance_content(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Json(req): Json<ContentRequest>,
) -> Result<impl IntoResponse, QuillError> {
    let text = state.ai.enhance_content(&req.content).await?;
    Ok(Json(ApiResponse::success(AiTextResponse { text })))
}

pub async fn summarize(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Json(req): Json<ContentRequest>,
) -> Result<impl IntoResponse, QuillError> {
    let text = state.ai.summarize(&req.content).await?;
    Ok(Json(ApiResponse::success(AiTextResponse { text })))
}
