//! Database layer for Quill.
//!
//! Uses PostgreSQL for persistent storage with sqlx. Counter mutations
//! (`likes`, `views`, `xp`, `total_posts`, `total_comments`) are expressed as
//! single atomic `UPDATE ... SET col = col + $n` statements so concurrent
//! writers never lose increments; no cross-table transaction wraps the
//! blog/ledger/user write triple (see the engagement orchestrator).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::blog::NewPost;
use crate::error::Result;
use crate::users::{CounterDelta, NewUser, ProfileUpdate};
use crate::xp::XpAction;

/// Storage operations the engagement orchestrator runs against.
///
/// `Database` is the production implementation; tests substitute an
/// in-memory store.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>>;
    async fn insert_blog(&self, post: &NewPost, xp_earned: u32) -> Result<BlogRow>;
    async fn get_blog(&self, blog_id: Uuid) -> Result<Option<BlogRow>>;
    async fn delete_blog(&self, blog_id: Uuid) -> Result<()>;
    async fn record_like(&self, blog_id: Uuid, user_id: Uuid) -> Result<Option<i64>>;
    async fn record_view(&self, blog_id: Uuid, user_id: Uuid) -> Result<Option<i64>>;
    async fn insert_comment(&self, blog_id: Uuid, user_id: Uuid, message: &str)
        -> Result<CommentRow>;
    async fn get_comments(&self, blog_id: Uuid) -> Result<Vec<CommentRow>>;
    async fn insert_xp_entry(&self, user_id: Uuid, action: XpAction, amount: u32)
        -> Result<XpLedgerRow>;
    async fn increment_user_counters(&self, user_id: Uuid, delta: CounterDelta) -> Result<()>;
}

/// Database connection and operations.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    pub async fn new(database_url: &str, max_connections: u32, min_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| crate::error::QuillError::from(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // User Operations
    // ═══════════════════════════════════════════════════════════════════════════

    /// Insert a new user. Uniqueness of username and email is enforced by
    /// constraints and surfaces as `DuplicateUser`.
    pub async fn insert_user(
        &self,
        user: &NewUser,
        password_hash: Option<String>,
    ) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_oauth_user,
                               first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.is_oauth_user)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Get user by ID.
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Find user by email (lowercased at registration).
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Apply optional profile fields and mark the profile completed.
    pub async fn complete_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserRow> {
        let social_links = update
            .social_links
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET bio = $2, website = $3, social_links = $4, profile_completed = TRUE
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&update.bio)
        .bind(&update.website)
        .bind(social_links)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Atomically apply non-negative counter deltas to a user.
    ///
    /// Fails with `UserNotFound` if the user reference does not resolve.
    pub async fn increment_user_counters(
        &self,
        user_id: Uuid,
        delta: CounterDelta,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET xp = xp + $2,
                total_posts = total_posts + $3,
                total_comments = total_comments + $4
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(delta.xp as i64)
        .bind(delta.total_posts as i64)
        .bind(delta.total_comments as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::QuillError::user_not_found(user_id));
        }

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Blog Operations
    // ═══════════════════════════════════════════════════════════════════════════

    /// Insert a new blog. Slug uniqueness is enforced by a constraint.
    pub async fn insert_blog(&self, post: &NewPost, xp_earned: u32) -> Result<BlogRow> {
        let row = sqlx::query_as::<_, BlogRow>(
            r#"
            INSERT INTO blogs (id, title, slug, content, author, cover_image, tags, xp_earned)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(post.author)
        .bind(&post.cover_image)
        .bind(&post.tags)
        .bind(xp_earned as i64)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Get blog by ID.
    pub async fn get_blog(&self, blog_id: Uuid) -> Result<Option<BlogRow>> {
        let row = sqlx::query_as::<_, BlogRow>("SELECT * FROM blogs WHERE id = $1")
            .bind(blog_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Hard-delete a blog. Membership rows and comments cascade.
    pub async fn delete_blog(&self, blog_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(blog_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Record a like: membership row and counter increment commit in one
    /// transaction, so `likes` always equals the number of membership rows.
    ///
    /// Returns `None` when the user already liked this blog (the unique
    /// membership row makes the duplicate check atomic), otherwise the new
    /// like total.
    pub async fn record_like(&self, blog_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO blog_likes (blog_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (blog_id, user_id) DO NOTHING
            "#,
        )
        .bind(blog_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let likes: i64 =
            sqlx::query_scalar("UPDATE blogs SET likes = likes + 1 WHERE id = $1 RETURNING likes")
                .bind(blog_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(Some(likes))
    }

    /// Record a view: membership row and counter increment commit in one
    /// transaction. Returns `None` if the user has viewed this blog before,
    /// otherwise the new view total.
    pub async fn record_view(&self, blog_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO blog_views (blog_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (blog_id, user_id) DO NOTHING
            "#,
        )
        .bind(blog_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let views: i64 =
            sqlx::query_scalar("UPDATE blogs SET views = views + 1 WHERE id = $1 RETURNING views")
                .bind(blog_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(Some(views))
    }

    /// Append a comment.
    pub async fn insert_comment(
        &self,
        blog_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> Result<CommentRow> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO blog_comments (blog_id, user_id, message)
            VALUES ($1, $2, $3)
            RETURNING id, blog_id, user_id, message, created_at
            "#,
        )
        .bind(blog_id)
        .bind(user_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Comments for a blog in submission order.
    pub async fn get_comments(&self, blog_id: Uuid) -> Result<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, blog_id, user_id, message, created_at
            FROM blog_comments
            WHERE blog_id = $1
            ORDER BY id
            "#,
        )
        .bind(blog_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // XP Ledger Operations
    // ═══════════════════════════════════════════════════════════════════════════

    /// Append an XP ledger entry. Entries are never updated or deleted.
    pub async fn insert_xp_entry(
        &self,
        user_id: Uuid,
        action: XpAction,
        amount: u32,
    ) -> Result<XpLedgerRow> {
        let row = sqlx::query_as::<_, XpLedgerRow>(
            r#"
            INSERT INTO xp_ledger (id, user_id, action, xp_gained)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, action, xp_gained, date_earned
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(action.as_str())
        .bind(amount as i32)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl EngagementStore for Database {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>> {
        Database::get_user(self, user_id).await
    }

    async fn insert_blog(&self, post: &NewPost, xp_earned: u32) -> Result<BlogRow> {
        Database::insert_blog(self, post, xp_earned).await
    }

    async fn get_blog(&self, blog_id: Uuid) -> Result<Option<BlogRow>> {
        Database::get_blog(self, blog_id).await
    }

    async fn delete_blog(&self, blog_id: Uuid) -> Result<()> {
        Database::delete_blog(self, blog_id).await
    }

    async fn record_like(&self, blog_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        Database::record_like(self, blog_id, user_id).await
    }

    async fn record_view(&self, blog_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        Database::record_view(self, blog_id, user_id).await
    }

    async fn insert_comment(
        &self,
        blog_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> Result<CommentRow> {
        Database::insert_comment(self, blog_id, user_id, message).await
    }

    async fn get_comments(&self, blog_id: Uuid) -> Result<Vec<CommentRow>> {
        Database::get_comments(self, blog_id).await
    }

    async fn insert_xp_entry(
        &self,
        user_id: Uuid,
        action: XpAction,
        amount: u32,
    ) -> Result<XpLedgerRow> {
        Database::insert_xp_entry(self, user_id, action, amount).await
    }

    async fn increment_user_counters(&self, user_id: Uuid, delta: CounterDelta) -> Result<()> {
        Database::increment_user_counters(self, user_id, delta).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Row Types (for sqlx queries)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_oauth_user: bool,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<serde_json::Value>,
    pub xp: i64,
    pub rank: String,
    pub total_posts: i64,
    pub total_comments: i64,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct BlogRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author: Uuid,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub likes: i64,
    pub views: i64,
    pub xp_earned: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct CommentRow {
    pub id: i64,
    pub blog_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct XpLedgerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub xp_gained: i32,
    pub date_earned: DateTime<Utc>,
}
