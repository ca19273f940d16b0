//! Tests for the engagement orchestrator's executed sequences, run against an
//! in-memory store.
//!
//! Tests cover:
//! - Create/like/comment/view/delete sequences end to end (ledger entries and
//!   user counters, not just planned grants)
//! - Duplicate like and view handling
//! - Best-effort grant semantics: a failed ledger write skips the counter
//!   update, a failed counter update never fails the action
//! - A failed like leaves no membership row, so it can be retried

use async_trait::async_trait;
use chrono::Utc;
use quill_core::blog::{NewPost, CONTENT_MIN_LEN};
use quill_core::db::{BlogRow, CommentRow, EngagementStore, UserRow, XpLedgerRow};
use quill_core::engagement::EngagementOrchestrator;
use quill_core::error::{ErrorCode, QuillError, Result};
use quill_core::users::CounterDelta;
use quill_core::xp::XpAction;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ============================================================================
// In-Memory Store
// ============================================================================

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, UserRow>,
    blogs: HashMap<Uuid, BlogRow>,
    likes: HashSet<(Uuid, Uuid)>,
    views: HashSet<(Uuid, Uuid)>,
    comments: Vec<CommentRow>,
    ledger: Vec<XpLedgerRow>,
    fail_next_like: bool,
    fail_ledger: bool,
    fail_counters: bool,
}

#[derive(Default)]
struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    fn add_user(&self, user_id: Uuid) {
        self.state().users.insert(user_id, user_row(user_id));
    }
}

#[async_trait]
impl EngagementStore for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.state().users.get(&user_id).cloned())
    }

    async fn insert_blog(&self, post: &NewPost, xp_earned: u32) -> Result<BlogRow> {
        let blog = BlogRow {
            id: Uuid::new_v4(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            author: post.author,
            cover_image: post.cover_image.clone(),
            tags: post.tags.clone(),
            likes: 0,
            views: 0,
            xp_earned: xp_earned as i64,
            created_at: Utc::now(),
        };
        self.state().blogs.insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn get_blog(&self, blog_id: Uuid) -> Result<Option<BlogRow>> {
        Ok(self.state().blogs.get(&blog_id).cloned())
    }

    async fn delete_blog(&self, blog_id: Uuid) -> Result<()> {
        let mut state = self.state();
        state.blogs.remove(&blog_id);
        state.likes.retain(|(b, _)| *b != blog_id);
        state.views.retain(|(b, _)| *b != blog_id);
        state.comments.retain(|c| c.blog_id != blog_id);
        Ok(())
    }

    async fn record_like(&self, blog_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        let mut state = self.state();
        if state.fail_next_like {
            // Atomic failure: nothing is recorded.
            state.fail_next_like = false;
            return Err(QuillError::internal("like write failed"));
        }
        if !state.likes.insert((blog_id, user_id)) {
            return Ok(None);
        }
        let blog = state
            .blogs
            .get_mut(&blog_id)
            .ok_or_else(|| QuillError::blog_not_found(blog_id))?;
        blog.likes += 1;
        Ok(Some(blog.likes))
    }

    async fn record_view(&self, blog_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        let mut state = self.state();
        if !state.views.insert((blog_id, user_id)) {
            return Ok(None);
        }
        let blog = state
            .blogs
            .get_mut(&blog_id)
            .ok_or_else(|| QuillError::blog_not_found(blog_id))?;
        blog.views += 1;
        Ok(Some(blog.views))
    }

    async fn insert_comment(
        &self,
        blog_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> Result<CommentRow> {
        let mut state = self.state();
        let comment = CommentRow {
            id: state.comments.len() as i64 + 1,
            blog_id,
            user_id,
            message: message.to_string(),
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comments(&self, blog_id: Uuid) -> Result<Vec<CommentRow>> {
        Ok(self
            .state()
            .comments
            .iter()
            .filter(|c| c.blog_id == blog_id)
            .cloned()
            .collect())
    }

    async fn insert_xp_entry(
        &self,
        user_id: Uuid,
        action: XpAction,
        amount: u32,
    ) -> Result<XpLedgerRow> {
        let mut state = self.state();
        if state.fail_ledger {
            return Err(QuillError::internal("ledger write failed"));
        }
        let entry = XpLedgerRow {
            id: Uuid::new_v4(),
            user_id,
            action: action.as_str().to_string(),
            xp_gained: amount as i32,
            date_earned: Utc::now(),
        };
        state.ledger.push(entry.clone());
        Ok(entry)
    }

    async fn increment_user_counters(&self, user_id: Uuid, delta: CounterDelta) -> Result<()> {
        let mut state = self.state();
        if state.fail_counters {
            return Err(QuillError::internal("counter update failed"));
        }
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| QuillError::user_not_found(user_id))?;
        user.xp += delta.xp as i64;
        user.total_posts += delta.total_posts as i64;
        user.total_comments += delta.total_comments as i64;
        Ok(())
    }
}

fn user_row(id: Uuid) -> UserRow {
    UserRow {
        id,
        username: format!("user_{}", &id.simple().to_string()[..8]),
        email: format!("{}@example.com", id.simple()),
        password_hash: None,
        is_oauth_user: false,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        profile_picture: "default-avatar.png".to_string(),
        bio: None,
        website: None,
        social_links: None,
        xp: 0,
        rank: "Novice".to_string(),
        total_posts: 0,
        total_comments: 0,
        profile_completed: false,
        created_at: Utc::now(),
    }
}

fn setup() -> (Arc<MemoryStore>, EngagementOrchestrator, Uuid) {
    let store = Arc::new(MemoryStore::default());
    let author = Uuid::new_v4();
    store.add_user(author);
    let orchestrator = EngagementOrchestrator::new(store.clone());
    (store, orchestrator, author)
}

fn new_post(author: Uuid) -> NewPost {
    NewPost::validate(
        "A Title Worth Reading",
        &"c".repeat(CONTENT_MIN_LEN),
        author,
        None,
        None,
    )
    .unwrap()
}

async fn create(orchestrator: &EngagementOrchestrator, author: Uuid) -> BlogRow {
    orchestrator.create_post(new_post(author)).await.unwrap()
}

// ============================================================================
// Creation Sequence
// ============================================================================

#[tokio::test]
async fn test_create_post_writes_ledger_and_counters() {
    let (store, orchestrator, author) = setup();

    let blog = create(&orchestrator, author).await;
    assert_eq!(blog.xp_earned, 20);

    let state = store.state();
    assert_eq!(state.ledger.len(), 1);
    assert_eq!(state.ledger[0].user_id, author);
    assert_eq!(state.ledger[0].action, "New Blog Post");
    assert_eq!(state.ledger[0].xp_gained, 20);

    let user = &state.users[&author];
    assert_eq!(user.xp, 20);
    assert_eq!(user.total_posts, 1);
    assert_eq!(user.total_comments, 0);
}

#[tokio::test]
async fn test_create_post_rejects_unknown_author() {
    let (store, orchestrator, _author) = setup();

    let err = orchestrator
        .create_post(new_post(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UserNotFound);

    let state = store.state();
    assert!(state.blogs.is_empty());
    assert!(state.ledger.is_empty());
}

// ============================================================================
// Like Sequence
// ============================================================================

#[tokio::test]
async fn test_first_like_increments_and_awards_author() {
    let (store, orchestrator, author) = setup();
    let liker = Uuid::new_v4();
    store.add_user(liker);

    let blog = create(&orchestrator, author).await;
    let outcome = orchestrator.like_post(blog.id, liker).await.unwrap();
    assert_eq!(outcome.likes, 1);

    let state = store.state();
    assert_eq!(state.blogs[&blog.id].likes, state.likes.len() as i64);
    assert_eq!(state.ledger.len(), 2);
    assert_eq!(state.ledger[1].user_id, author);
    assert_eq!(state.ledger[1].action, "Like Received");
    assert_eq!(state.users[&author].xp, 22);
    assert_eq!(state.users[&liker].xp, 0);
}

#[tokio::test]
async fn test_duplicate_like_is_rejected_without_side_effects() {
    let (store, orchestrator, author) = setup();
    let liker = Uuid::new_v4();
    store.add_user(liker);

    let blog = create(&orchestrator, author).await;
    orchestrator.like_post(blog.id, liker).await.unwrap();

    let err = orchestrator.like_post(blog.id, liker).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadyLiked);

    let state = store.state();
    assert_eq!(state.blogs[&blog.id].likes, 1);
    assert_eq!(state.ledger.len(), 2);
    assert_eq!(state.users[&author].xp, 22);
}

#[tokio::test]
async fn test_failed_like_leaves_state_retryable() {
    let (store, orchestrator, author) = setup();
    let liker = Uuid::new_v4();
    store.add_user(liker);

    let blog = create(&orchestrator, author).await;
    store.state().fail_next_like = true;

    let err = orchestrator.like_post(blog.id, liker).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InternalError);
    {
        let state = store.state();
        assert!(state.likes.is_empty());
        assert_eq!(state.blogs[&blog.id].likes, 0);
        assert_eq!(state.ledger.len(), 1); // creation entry only
    }

    // The failed attempt recorded nothing, so a retry succeeds.
    let outcome = orchestrator.like_post(blog.id, liker).await.unwrap();
    assert_eq!(outcome.likes, 1);

    let state = store.state();
    assert_eq!(state.blogs[&blog.id].likes, state.likes.len() as i64);
    assert_eq!(state.users[&author].xp, 22);
}

#[tokio::test]
async fn test_like_unknown_blog_is_not_found() {
    let (_store, orchestrator, author) = setup();
    let err = orchestrator
        .like_post(Uuid::new_v4(), author)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::BlogNotFound);
}

// ============================================================================
// Comment Sequence
// ============================================================================

#[tokio::test]
async fn test_comment_awards_both_parties() {
    let (store, orchestrator, author) = setup();
    let commenter = Uuid::new_v4();
    store.add_user(commenter);

    let blog = create(&orchestrator, author).await;
    let comments = orchestrator
        .comment_on_post(blog.id, commenter, "great read")
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].message, "great read");

    let state = store.state();
    let actions: Vec<&str> = state.ledger.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["New Blog Post", "Commented", "Comment Received"]);
    assert_eq!(state.users[&commenter].xp, 2);
    assert_eq!(state.users[&commenter].total_comments, 1);
    assert_eq!(state.users[&author].xp, 25);
}

#[tokio::test]
async fn test_comments_preserve_submission_order() {
    let (store, orchestrator, author) = setup();
    let commenter = Uuid::new_v4();
    store.add_user(commenter);

    let blog = create(&orchestrator, author).await;
    orchestrator
        .comment_on_post(blog.id, commenter, "first")
        .await
        .unwrap();
    let comments = orchestrator
        .comment_on_post(blog.id, author, "second")
        .await
        .unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].message, "first");
    assert_eq!(comments[1].message, "second");
}

// ============================================================================
// View Sequence
// ============================================================================

#[tokio::test]
async fn test_views_count_once_per_user_and_grant_nothing() {
    let (store, orchestrator, author) = setup();
    let viewer = Uuid::new_v4();
    store.add_user(viewer);

    let blog = create(&orchestrator, author).await;

    // Anonymous fetch never counts.
    let fetched = orchestrator.view_post(blog.id, None).await.unwrap();
    assert_eq!(fetched.views, 0);

    let fetched = orchestrator.view_post(blog.id, Some(viewer)).await.unwrap();
    assert_eq!(fetched.views, 1);

    let fetched = orchestrator.view_post(blog.id, Some(viewer)).await.unwrap();
    assert_eq!(fetched.views, 1);

    let state = store.state();
    assert_eq!(state.blogs[&blog.id].views, state.views.len() as i64);
    assert_eq!(state.ledger.len(), 1); // creation entry only
}

// ============================================================================
// Best-Effort Grant Semantics
// ============================================================================

#[tokio::test]
async fn test_ledger_failure_skips_counter_update_but_action_succeeds() {
    let (store, orchestrator, author) = setup();
    let liker = Uuid::new_v4();
    store.add_user(liker);

    let blog = create(&orchestrator, author).await;
    store.state().fail_ledger = true;

    let outcome = orchestrator.like_post(blog.id, liker).await.unwrap();
    assert_eq!(outcome.likes, 1);

    let state = store.state();
    assert_eq!(state.ledger.len(), 1); // creation entry only
    assert_eq!(state.users[&author].xp, 20); // counter never ran ahead
}

#[tokio::test]
async fn test_counter_failure_after_ledger_write_does_not_fail_action() {
    let (store, orchestrator, author) = setup();
    let liker = Uuid::new_v4();
    store.add_user(liker);

    let blog = create(&orchestrator, author).await;
    store.state().fail_counters = true;

    let outcome = orchestrator.like_post(blog.id, liker).await.unwrap();
    assert_eq!(outcome.likes, 1);

    let state = store.state();
    assert_eq!(state.ledger.len(), 2); // entry written before the failure
    assert_eq!(state.users[&author].xp, 20);
}

// ============================================================================
// Delete Sequence
// ============================================================================

#[tokio::test]
async fn test_only_the_author_may_delete() {
    let (store, orchestrator, author) = setup();
    let stranger = Uuid::new_v4();
    store.add_user(stranger);

    let blog = create(&orchestrator, author).await;

    let err = orchestrator.delete_post(blog.id, stranger).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert!(store.state().blogs.contains_key(&blog.id));

    orchestrator.delete_post(blog.id, author).await.unwrap();
    assert!(store.state().blogs.is_empty());
}
