//! Engagement orchestrator.
//!
//! For each triggering event (create, like, comment, view) the orchestrator
//! runs a fixed ordered sequence: apply the blog aggregate mutation, then for
//! each XP-eligible sub-event validate points against the policy table, write
//! a ledger entry, and update the recipient's counters.
//!
//! Each blog mutation is internally consistent: the store commits a like or
//! view membership row and its counter increment together. The ledger and
//! counter steps that follow are best-effort: there is no transaction across
//! the blog/ledger/user writes, no rollback of an applied blog mutation, and
//! no retry. Partial failures are logged with structured fields rather than
//! hidden. A missed ledger entry is an accepted inconsistency under this
//! design.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::blog::{validate_comment, NewPost};
use crate::db::{BlogRow, CommentRow, EngagementStore};
use crate::error::{ErrorCode, QuillError, Result};
use crate::users::CounterDelta;
use crate::xp::{LedgerWriter, XpAction};

/// One planned XP grant: who receives it, for what action, and which user
/// counters move alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantPlan {
    pub recipient: Uuid,
    pub action: XpAction,
    pub delta: CounterDelta,
}

impl GrantPlan {
    fn new(recipient: Uuid, action: XpAction, delta: CounterDelta) -> Self {
        Self {
            recipient,
            action,
            delta,
        }
    }
}

/// Grants fired by a successful post creation: the author earns `NewPost`
/// points and `total_posts` advances by one.
pub fn creation_grants(author: Uuid) -> Vec<GrantPlan> {
    vec![GrantPlan::new(
        author,
        XpAction::NewPost,
        CounterDelta::xp(XpAction::NewPost.points()).with_post(),
    )]
}

/// Grants fired by a first-time like: the blog author earns `LikeReceived`.
/// The liker earns nothing.
pub fn like_grants(author: Uuid) -> Vec<GrantPlan> {
    vec![GrantPlan::new(
        author,
        XpAction::LikeReceived,
        CounterDelta::xp(XpAction::LikeReceived.points()),
    )]
}

/// Grants fired by a comment: the commenter earns `Commented` (and
/// `total_comments` advances), the blog author earns `CommentReceived`.
pub fn comment_grants(commenter: Uuid, author: Uuid) -> Vec<GrantPlan> {
    vec![
        GrantPlan::new(
            commenter,
            XpAction::Commented,
            CounterDelta::xp(XpAction::Commented.points()).with_comment(),
        ),
        GrantPlan::new(
            author,
            XpAction::CommentReceived,
            CounterDelta::xp(XpAction::CommentReceived.points()),
        ),
    ]
}

/// Views are not XP-eligible.
pub fn view_grants() -> Vec<GrantPlan> {
    Vec::new()
}

/// Result of a like action.
#[derive(Debug, serde::Serialize)]
pub struct LikeOutcome {
    pub likes: i64,
}

/// Drives the per-action engagement sequences.
#[derive(Clone)]
pub struct EngagementOrchestrator {
    store: Arc<dyn EngagementStore>,
    ledger: LedgerWriter,
}

impl EngagementOrchestrator {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        let ledger = LedgerWriter::new(store.clone());
        Self { store, ledger }
    }

    /// Create a blog post and award creation XP to the author.
    ///
    /// `xp_earned` on the blog is fixed at creation from the policy table.
    pub async fn create_post(&self, post: NewPost) -> Result<BlogRow> {
        let author = self
            .store
            .get_user(post.author)
            .await?
            .ok_or_else(|| QuillError::user_not_found(post.author))?;

        let xp_earned = XpAction::NewPost.points();
        let blog = self.store.insert_blog(&post, xp_earned).await?;

        info!(blog_id = %blog.id, author = %author.id, slug = %blog.slug, "Blog created");

        for grant in creation_grants(author.id) {
            self.award(blog.id, &grant).await;
        }

        Ok(blog)
    }

    /// Like a blog on behalf of a user.
    ///
    /// A second like by the same user is rejected with `AlreadyLiked` and
    /// leaves the counter unchanged. A first like awards XP to the author.
    /// The membership row and counter commit together, so a failed like
    /// leaves no trace and can be retried.
    pub async fn like_post(&self, blog_id: Uuid, user_id: Uuid) -> Result<LikeOutcome> {
        let blog = self
            .store
            .get_blog(blog_id)
            .await?
            .ok_or_else(|| QuillError::blog_not_found(blog_id))?;

        let likes = self
            .store
            .record_like(blog_id, user_id)
            .await?
            .ok_or_else(|| QuillError::already_liked(blog_id))?;

        for grant in like_grants(blog.author) {
            self.award(blog_id, &grant).await;
        }

        Ok(LikeOutcome { likes })
    }

    /// Append a comment and award XP to both commenter and author.
    ///
    /// Returns the blog's full comment list in submission order.
    pub async fn comment_on_post(
        &self,
        blog_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> Result<Vec<CommentRow>> {
        let message = validate_comment(message)?;

        let blog = self
            .store
            .get_blog(blog_id)
            .await?
            .ok_or_else(|| QuillError::blog_not_found(blog_id))?;

        self.store.insert_comment(blog_id, user_id, message).await?;

        for grant in comment_grants(user_id, blog.author) {
            self.award(blog_id, &grant).await;
        }

        self.store.get_comments(blog_id).await
    }

    /// Fetch a blog, counting the view on a user's first visit.
    ///
    /// Anonymous requests return the blog without touching the counter.
    pub async fn view_post(&self, blog_id: Uuid, viewer: Option<Uuid>) -> Result<BlogRow> {
        let mut blog = self
            .store
            .get_blog(blog_id)
            .await?
            .ok_or_else(|| QuillError::blog_not_found(blog_id))?;

        if let Some(user_id) = viewer {
            if let Some(views) = self.store.record_view(blog_id, user_id).await? {
                blog.views = views;
            }
        }

        Ok(blog)
    }

    /// Hard-delete a blog. Only the author may delete.
    pub async fn delete_post(&self, blog_id: Uuid, user_id: Uuid) -> Result<()> {
        let blog = self
            .store
            .get_blog(blog_id)
            .await?
            .ok_or_else(|| QuillError::blog_not_found(blog_id))?;

        if blog.author != user_id {
            return Err(QuillError::forbidden("Not authorized to delete this blog"));
        }

        self.store.delete_blog(blog_id).await?;
        info!(blog_id = %blog_id, author = %user_id, "Blog deleted");

        Ok(())
    }

    /// Execute one planned grant: ledger entry first, then the counter
    /// update. Failures never propagate to the triggering action; a failed
    /// ledger write also skips the counter update for that grant so the
    /// counter never runs ahead of the audit trail.
    async fn award(&self, blog_id: Uuid, grant: &GrantPlan) {
        let amount = grant.action.points();

        match self.ledger.record(grant.recipient, grant.action, amount).await {
            Ok(entry) => {
                debug!(
                    user = %grant.recipient,
                    action = %grant.action,
                    xp = entry.xp_gained,
                    blog_id = %blog_id,
                    "XP granted"
                );
            }
            Err(e) if e.code() == ErrorCode::InvalidGrant => {
                // Policy rejection: skip silently, the action still succeeds.
                debug!(
                    user = %grant.recipient,
                    action = %grant.action,
                    "XP grant rejected by policy"
                );
                return;
            }
            Err(e) => {
                warn!(
                    user = %grant.recipient,
                    action = %grant.action,
                    blog_id = %blog_id,
                    error = %e,
                    "Ledger write failed; skipping counter update for this grant"
                );
                return;
            }
        }

        if let Err(e) = self
            .store
            .increment_user_counters(grant.recipient, grant.delta)
            .await
        {
            warn!(
                user = %grant.recipient,
                action = %grant.action,
                blog_id = %blog_id,
                error = %e,
                "Counter update failed after ledger write"
            );
        }
    }
}
