use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::analytics::ViewedPost;
use crate::models::comment::{Comment, CommentForm};
use crate::models::contact::{ContactForm, ContactMessage};
use crate::models::newsletter::Subscriber;
use crate::models::portfolio::{Project, ProjectChanges, ProjectFilter, ProjectForm};
use crate::models::post::{NewPost, Post, PostChanges, PostFilter, StatusFilter};
use crate::models::user::User;

pub mod demo;
mod demo_data;
pub mod sqlite;

/// Unified data-access trait. Every database operation goes through here.
/// Implementations: `SqliteStore` (wraps rusqlite/r2d2) and `DemoStore`
/// (fixed in-memory rows, writes accepted and dropped).
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<()>;

    /// Return the backend name: "sqlite" or "demo"
    fn db_backend(&self) -> &str;

    fn is_demo(&self) -> bool {
        self.db_backend() == "demo"
    }

    // ── Posts ────────────────────────────────────────────────────────
    fn post_find_by_id(&self, id: i64) -> Result<Option<Post>>;
    fn post_find_by_slug(&self, slug: &str) -> Result<Option<Post>>;
    /// Newest first (created_at, then id, descending).
    fn post_list(&self, filter: &PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>>;
    fn post_count(&self, filter: &PostFilter) -> Result<i64>;
    /// Tag lists of every post matching `status`, newest post first.
    fn post_tag_lists(&self, status: StatusFilter) -> Result<Vec<Vec<String>>>;
    fn post_create(&self, post: &NewPost) -> Result<i64>;
    /// False when no post has `id`.
    fn post_update(&self, id: i64, changes: &PostChanges) -> Result<bool>;
    /// Removes the post together with its comments and views.
    fn post_delete(&self, id: i64) -> Result<()>;

    // ── Post views ──────────────────────────────────────────────────
    fn post_view_record(&self, post_id: i64, referrer: Option<&str>) -> Result<()>;
    fn post_view_count(&self) -> Result<i64>;
    fn post_view_count_for(&self, post_id: i64) -> Result<i64>;
    fn post_view_times_since(&self, since: NaiveDateTime) -> Result<Vec<NaiveDateTime>>;
    /// The posts behind the `limit` most recent view rows, one entry per view.
    fn post_view_sample(&self, limit: i64) -> Result<Vec<ViewedPost>>;

    // ── Comments ────────────────────────────────────────────────────
    fn comment_find_by_id(&self, id: i64) -> Result<Option<Comment>>;
    /// Newest first, optionally narrowed to one post and/or approval state.
    fn comment_list(&self, post_id: Option<i64>, approved: Option<bool>) -> Result<Vec<Comment>>;
    /// Stored unapproved.
    fn comment_create(&self, post_id: i64, form: &CommentForm) -> Result<i64>;
    fn comment_set_approved(&self, id: i64, approved: bool) -> Result<()>;
    fn comment_delete(&self, id: i64) -> Result<()>;

    // ── Newsletter ──────────────────────────────────────────────────
    /// Fails with `Error::AlreadySubscribed` when the email is taken.
    fn subscriber_create(&self, email: &str) -> Result<i64>;
    /// Newest first.
    fn subscriber_list(&self) -> Result<Vec<Subscriber>>;
    fn subscriber_count(&self, confirmed_only: bool) -> Result<i64>;
    fn subscriber_times_since(&self, since: NaiveDateTime) -> Result<Vec<NaiveDateTime>>;

    // ── Contact messages ────────────────────────────────────────────
    fn contact_create(&self, form: &ContactForm) -> Result<i64>;
    /// Newest first.
    fn contact_list(&self) -> Result<Vec<ContactMessage>>;
    fn contact_mark_read(&self, id: i64) -> Result<()>;
    fn contact_count(&self) -> Result<i64>;

    // ── Portfolio ───────────────────────────────────────────────────
    fn project_find_by_id(&self, id: i64) -> Result<Option<Project>>;
    /// Ascending sort_order, then id.
    fn project_list(&self, filter: &ProjectFilter) -> Result<Vec<Project>>;
    fn project_create(&self, form: &ProjectForm) -> Result<i64>;
    /// False when no project has `id`.
    fn project_update(&self, id: i64, changes: &ProjectChanges) -> Result<bool>;
    fn project_delete(&self, id: i64) -> Result<()>;

    // ── Users ───────────────────────────────────────────────────────
    fn user_get_by_id(&self, id: i64) -> Result<Option<User>>;
    fn user_get_by_email(&self, email: &str) -> Result<Option<User>>;
    fn user_count(&self) -> Result<i64>;
    fn user_create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
        role: &str,
    ) -> Result<i64>;
    fn user_update_password(&self, id: i64, password_hash: &str) -> Result<()>;

    // ── Sessions ────────────────────────────────────────────────────
    fn session_create(&self, user_id: i64, token: &str, expires_at: NaiveDateTime) -> Result<()>;
    /// The owner of an unexpired session.
    fn session_get_user_id(&self, token: &str) -> Result<Option<i64>>;
    fn session_get_user(&self, token: &str) -> Result<Option<User>> {
        match self.session_get_user_id(token)? {
            Some(id) => self.user_get_by_id(id),
            None => Ok(None),
        }
    }
    fn session_delete(&self, token: &str) -> Result<()>;
    fn session_delete_for_user(&self, user_id: i64) -> Result<()>;
    fn session_cleanup_expired(&self) -> Result<usize>;

    // ── Password resets ─────────────────────────────────────────────
    fn reset_token_create(&self, token_hash: &str, email: &str, expires_at: NaiveDateTime)
        -> Result<()>;
    /// Marks an unused, unexpired token as used and returns its email.
    fn reset_token_consume(&self, token_hash: &str) -> Result<Option<String>>;
}
