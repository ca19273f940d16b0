#![allow(clippy::result_large_err)]
//! # Quill Core
//!
//! Backend for the Quill blogging platform.
//!
//! ## Architecture
//!
//! - **Auth**: Credential and OAuth registration, Argon2 hashing, JWT sessions
//! - **Blog**: Post validation, slugs, comments
//! - **Engagement**: Likes, views, and comment orchestration with XP grants
//! - **XP**: Fixed action/points policy table and append-only ledger
//! - **AI**: Proxy to a generative text upstream for titles, rewrites, summaries
//! - **Observability**: Structured tracing and Prometheus metrics

pub mod ai;
pub mod api;
pub mod auth;
pub mod blog;
pub mod config;
pub mod db;
pub mod engagement;
pub mod error;
pub mod observability;
pub mod users;
pub mod xp;

pub use error::{ErrorCode, ErrorDetails, ErrorSeverity, QuillError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::AiClient;
    pub use crate::api::{build_router, ApiResponse, AppState};
    pub use crate::auth::{AuthUser, Claims, MaybeAuthUser, TokenService};
    pub use crate::blog::{slugify, NewPost};
    pub use crate::db::{BlogRow, CommentRow, Database, EngagementStore, UserRow, XpLedgerRow};
    pub use crate::engagement::{EngagementOrchestrator, GrantPlan, LikeOutcome};
    pub use crate::error::{ErrorCode, ErrorDetails, ErrorSeverity, QuillError, Result};
    pub use crate::users::{CounterDelta, NewUser, ProfileUpdate, SocialLinks};
    pub use crate::xp::{LedgerWriter, XpAction};
}
