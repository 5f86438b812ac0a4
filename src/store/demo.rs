use chrono::{NaiveDateTime, Utc};
use log::debug;

use crate::error::Result;
use crate::models::analytics::ViewedPost;
use crate::models::comment::{Comment, CommentForm};
use crate::models::contact::{ContactForm, ContactMessage};
use crate::models::newsletter::Subscriber;
use crate::models::portfolio::{Project, ProjectChanges, ProjectFilter, ProjectForm};
use crate::models::post::{NewPost, Post, PostChanges, PostFilter, StatusFilter};
use crate::models::user::User;

use super::demo_data::{self, DemoData};
use super::Store;

/// Store used when no database is configured. Reads are served from a fixed
/// dataset; writes report success and are dropped.
pub struct DemoStore {
    data: DemoData,
}

impl DemoStore {
    pub fn new() -> Self {
        Self::at(Utc::now().naive_utc())
    }

    /// Dataset anchored at a fixed instant.
    pub fn at(now: NaiveDateTime) -> Self {
        DemoStore { data: demo_data::build(now) }
    }

    fn dropped(&self, op: &str) {
        debug!("demo mode: {} not persisted", op);
    }

    /// Matching posts, newest first.
    fn sorted_posts(&self, filter: &PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.data.posts.iter().filter(|p| filter.matches(p)).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }
}

impl Default for DemoStore {
    fn default() -> Self {
        Self::new()
    }
}

fn page<T: Clone>(items: Vec<&T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

impl Store for DemoStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<()> {
        Ok(())
    }

    fn db_backend(&self) -> &str {
        "demo"
    }

    // ── Posts ───────────────────────────────────────────────────────

    fn post_find_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.data.posts.iter().find(|p| p.id == id).cloned())
    }

    fn post_find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        Ok(self.data.posts.iter().find(|p| p.slug == slug).cloned())
    }

    fn post_list(&self, filter: &PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>> {
        Ok(page(self.sorted_posts(filter), limit, offset))
    }

    fn post_count(&self, filter: &PostFilter) -> Result<i64> {
        Ok(self.data.posts.iter().filter(|p| filter.matches(p)).count() as i64)
    }

    fn post_tag_lists(&self, status: StatusFilter) -> Result<Vec<Vec<String>>> {
        let filter = PostFilter { status, ..Default::default() };
        Ok(self.sorted_posts(&filter).into_iter().map(|p| p.tags.clone()).collect())
    }

    fn post_create(&self, _post: &NewPost) -> Result<i64> {
        self.dropped("post_create");
        Ok(0)
    }

    fn post_update(&self, id: i64, _changes: &PostChanges) -> Result<bool> {
        self.dropped("post_update");
        Ok(self.data.posts.iter().any(|p| p.id == id))
    }

    fn post_delete(&self, _id: i64) -> Result<()> {
        self.dropped("post_delete");
        Ok(())
    }

    // ── Post views ──────────────────────────────────────────────────

    fn post_view_record(&self, _post_id: i64, _referrer: Option<&str>) -> Result<()> {
        self.dropped("post_view_record");
        Ok(())
    }

    fn post_view_count(&self) -> Result<i64> {
        Ok(self.data.views.len() as i64)
    }

    fn post_view_count_for(&self, post_id: i64) -> Result<i64> {
        Ok(self.data.views.iter().filter(|v| v.post_id == post_id).count() as i64)
    }

    fn post_view_times_since(&self, since: NaiveDateTime) -> Result<Vec<NaiveDateTime>> {
        let mut times: Vec<NaiveDateTime> = self
            .data
            .views
            .iter()
            .map(|v| v.viewed_at)
            .filter(|t| *t >= since)
            .collect();
        times.sort();
        Ok(times)
    }

    fn post_view_sample(&self, limit: i64) -> Result<Vec<ViewedPost>> {
        let mut views: Vec<_> = self.data.views.iter().collect();
        views.sort_by(|a, b| b.viewed_at.cmp(&a.viewed_at).then(b.id.cmp(&a.id)));
        Ok(views
            .into_iter()
            .take(limit.max(0) as usize)
            .filter_map(|v| self.data.posts.iter().find(|p| p.id == v.post_id))
            .map(|p| ViewedPost {
                id: p.id,
                title: p.title.clone(),
                slug: p.slug.clone(),
            })
            .collect())
    }

    // ── Comments ────────────────────────────────────────────────────

    fn comment_find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.data.comments.iter().find(|c| c.id == id).cloned())
    }

    fn comment_list(&self, post_id: Option<i64>, approved: Option<bool>) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .data
            .comments
            .iter()
            .filter(|c| post_id.map_or(true, |id| c.post_id == id))
            .filter(|c| approved.map_or(true, |a| c.approved == a))
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }

    fn comment_create(&self, _post_id: i64, _form: &CommentForm) -> Result<i64> {
        self.dropped("comment_create");
        Ok(0)
    }

    fn comment_set_approved(&self, _id: i64, _approved: bool) -> Result<()> {
        self.dropped("comment_set_approved");
        Ok(())
    }

    fn comment_delete(&self, _id: i64) -> Result<()> {
        self.dropped("comment_delete");
        Ok(())
    }

    // ── Newsletter ──────────────────────────────────────────────────

    fn subscriber_create(&self, _email: &str) -> Result<i64> {
        self.dropped("subscriber_create");
        Ok(0)
    }

    fn subscriber_list(&self) -> Result<Vec<Subscriber>> {
        let mut subs = self.data.subscribers.clone();
        subs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(subs)
    }

    fn subscriber_count(&self, confirmed_only: bool) -> Result<i64> {
        Ok(self
            .data
            .subscribers
            .iter()
            .filter(|s| !confirmed_only || s.confirmed)
            .count() as i64)
    }

    fn subscriber_times_since(&self, since: NaiveDateTime) -> Result<Vec<NaiveDateTime>> {
        let mut times: Vec<NaiveDateTime> = self
            .data
            .subscribers
            .iter()
            .map(|s| s.created_at)
            .filter(|t| *t >= since)
            .collect();
        times.sort();
        Ok(times)
    }

    // ── Contact messages ────────────────────────────────────────────

    fn contact_create(&self, _form: &ContactForm) -> Result<i64> {
        self.dropped("contact_create");
        Ok(0)
    }

    fn contact_list(&self) -> Result<Vec<ContactMessage>> {
        let mut messages = self.data.messages.clone();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(messages)
    }

    fn contact_mark_read(&self, _id: i64) -> Result<()> {
        self.dropped("contact_mark_read");
        Ok(())
    }

    fn contact_count(&self) -> Result<i64> {
        Ok(self.data.messages.len() as i64)
    }

    // ── Portfolio ───────────────────────────────────────────────────

    fn project_find_by_id(&self, id: i64) -> Result<Option<Project>> {
        Ok(self.data.projects.iter().find(|p| p.id == id).cloned())
    }

    fn project_list(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        let mut projects: Vec<&Project> =
            self.data.projects.iter().filter(|p| filter.matches(p)).collect();
        projects.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        let limit = filter.limit.unwrap_or(i64::MAX);
        Ok(page(projects, limit, 0))
    }

    fn project_create(&self, _form: &ProjectForm) -> Result<i64> {
        self.dropped("project_create");
        Ok(0)
    }

    fn project_update(&self, id: i64, _changes: &ProjectChanges) -> Result<bool> {
        self.dropped("project_update");
        Ok(self.data.projects.iter().any(|p| p.id == id))
    }

    fn project_delete(&self, _id: i64) -> Result<()> {
        self.dropped("project_delete");
        Ok(())
    }

    // ── Users ───────────────────────────────────────────────────────

    fn user_get_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.data.users.iter().find(|u| u.id == id).cloned())
    }

    fn user_get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .data
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn user_count(&self) -> Result<i64> {
        Ok(self.data.users.len() as i64)
    }

    fn user_create(
        &self,
        _email: &str,
        _password_hash: &str,
        _full_name: Option<&str>,
        _role: &str,
    ) -> Result<i64> {
        self.dropped("user_create");
        Ok(0)
    }

    fn user_update_password(&self, _id: i64, _password_hash: &str) -> Result<()> {
        self.dropped("user_update_password");
        Ok(())
    }

    // ── Sessions ────────────────────────────────────────────────────

    fn session_create(&self, _user_id: i64, _token: &str, _expires_at: NaiveDateTime) -> Result<()> {
        self.dropped("session_create");
        Ok(())
    }

    fn session_get_user_id(&self, _token: &str) -> Result<Option<i64>> {
        Ok(None)
    }

    fn session_delete(&self, _token: &str) -> Result<()> {
        Ok(())
    }

    fn session_delete_for_user(&self, _user_id: i64) -> Result<()> {
        Ok(())
    }

    fn session_cleanup_expired(&self) -> Result<usize> {
        Ok(0)
    }

    // ── Password resets ─────────────────────────────────────────────

    fn reset_token_create(
        &self,
        _token_hash: &str,
        _email: &str,
        _expires_at: NaiveDateTime,
    ) -> Result<()> {
        self.dropped("reset_token_create");
        Ok(())
    }

    fn reset_token_consume(&self, _token_hash: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::post::PostStatus;

    fn store() -> DemoStore {
        DemoStore::new()
    }

    #[test]
    fn test_demo_reads_serve_fixed_dataset() {
        let s = store();
        assert!(s.is_demo());
        assert_eq!(s.post_count(&PostFilter::default()).unwrap(), 5);
        let all = PostFilter { status: StatusFilter::All, ..Default::default() };
        assert_eq!(s.post_count(&all).unwrap(), 7);
        assert_eq!(s.project_list(&ProjectFilter::default()).unwrap().len(), 6);
        assert_eq!(s.subscriber_count(false).unwrap(), 6);
        assert_eq!(s.contact_count().unwrap(), 3);
    }

    #[test]
    fn test_demo_published_listing_excludes_drafts() {
        let s = store();
        let posts = s.post_list(&PostFilter::default(), 100, 0).unwrap();
        assert!(posts.iter().all(|p| p.status == PostStatus::Published));
        for pair in posts.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn test_demo_writes_succeed_without_persisting() {
        let s = store();
        let before = s.subscriber_count(false).unwrap();
        s.subscriber_create("new@x.com").unwrap();
        s.subscriber_create("new@x.com").unwrap();
        assert_eq!(s.subscriber_count(false).unwrap(), before);

        s.post_delete(1).unwrap();
        assert!(s.post_find_by_id(1).unwrap().is_some());

        s.comment_set_approved(2, true).unwrap();
        assert!(!s.comment_find_by_id(2).unwrap().unwrap().approved);
    }

    #[test]
    fn test_demo_views_cover_last_month() {
        let now = Utc::now().naive_utc();
        let s = DemoStore::at(now);
        assert!(s.post_view_count().unwrap() > 0);
        let recent = s.post_view_times_since(now - Duration::days(7)).unwrap();
        assert!(!recent.is_empty());
        assert!(recent.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(s.post_view_sample(10).unwrap().len(), 10);
    }

    #[test]
    fn test_demo_sessions_never_authenticate() {
        let s = store();
        s.session_create(1, "tok", Utc::now().naive_utc()).unwrap();
        assert!(s.session_get_user("tok").unwrap().is_none());
    }
}
