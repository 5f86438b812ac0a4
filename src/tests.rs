#![cfg(test)]

use std::sync::Arc;

use chrono::Utc;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;

use crate::config::SiteConfig;
use crate::error::Error;
use crate::models::comment::{CommentFilter, CommentForm};
use crate::models::contact::ContactForm;
use crate::models::portfolio::ProjectForm;
use crate::models::post::{PostChanges, PostForm, PostQuery, PostStatus, StatusFilter};
use crate::security::{auth, password_reset};
use crate::store::demo::DemoStore;
use crate::store::sqlite::SqliteStore;
use crate::store::Store;
use crate::{analytics, boot, content, engagement, portfolio};

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Fresh SQLite store over a private in-memory database, migrated.
fn test_store() -> Arc<dyn Store> {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let pool = crate::db::init_memory_pool(&format!("app_test_{}", id))
        .expect("Failed to create test pool");
    let store = SqliteStore::new(pool);
    store.run_migrations().expect("Failed to run migrations");
    Arc::new(store)
}

fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.site.url = "http://localhost:8000".to_string();
    config
}

/// Fast bcrypt hash for tests (cost=4 instead of DEFAULT_COST=12).
fn fast_hash(password: &str) -> String {
    bcrypt::hash(password, 4).unwrap()
}

fn seed_operator(store: &dyn Store) -> i64 {
    store
        .user_create("op@modarntech.com", &fast_hash("correct horse"), Some("Operator"), "admin")
        .unwrap()
}

fn publish(store: &dyn Store, title: &str, tags: &[&str]) -> i64 {
    let form = PostForm {
        title: title.to_string(),
        description: Some(format!("Notes on {}", title)),
        content: "A short body of text".to_string(),
        status: Some(PostStatus::Published),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    };
    content::create_post(store, &form, None).unwrap()
}

fn draft(store: &dyn Store, title: &str, status: PostStatus, tags: &[&str]) -> i64 {
    let form = PostForm {
        title: title.to_string(),
        status: Some(status),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    };
    content::create_post(store, &form, None).unwrap()
}

fn comment(name: &str) -> CommentForm {
    CommentForm {
        author_name: name.to_string(),
        author_email: format!("{}@example.com", name.to_lowercase()),
        content: "Thanks for writing this".to_string(),
    }
}

// ═══════════════════════════════════════════════════════════
// Content repository
// ═══════════════════════════════════════════════════════════

#[test]
fn create_post_derives_slug_and_read_time() {
    let store = test_store();
    let form = PostForm {
        title: "Hello, World: Rust & React!".to_string(),
        content: "word ".repeat(450),
        ..Default::default()
    };
    let id = content::create_post(store.as_ref(), &form, None).unwrap();
    let post = content::get_post(store.as_ref(), id).unwrap().unwrap();
    assert_eq!(post.slug, "hello-world-rust-react");
    assert_eq!(post.read_time, 3);
    assert_eq!(post.status, PostStatus::Draft);
}

#[test]
fn create_post_normalizes_explicit_slug() {
    let store = test_store();
    let form = PostForm {
        title: "Anything".to_string(),
        slug: Some("  My Custom Slug ".to_string()),
        ..Default::default()
    };
    let id = content::create_post(store.as_ref(), &form, None).unwrap();
    assert_eq!(content::get_post(store.as_ref(), id).unwrap().unwrap().slug, "my-custom-slug");
}

#[test]
fn create_post_rejects_title_without_slug_characters() {
    let store = test_store();
    let form = PostForm { title: "!!! ???".to_string(), ..Default::default() };
    let err = content::create_post(store.as_ref(), &form, None).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let blank = PostForm { title: "   ".to_string(), ..Default::default() };
    assert!(matches!(
        content::create_post(store.as_ref(), &blank, None).unwrap_err(),
        Error::Validation(_)
    ));
}

#[test]
fn create_post_records_author_name() {
    let store = test_store();
    let uid = seed_operator(store.as_ref());
    let form = PostForm { title: "Authored".to_string(), ..Default::default() };
    let id = content::create_post(store.as_ref(), &form, Some(uid)).unwrap();
    let post = content::get_post(store.as_ref(), id).unwrap().unwrap();
    assert_eq!(post.author_id, Some(uid));
    assert_eq!(post.author_name.as_deref(), Some("Operator"));
}

#[test]
fn pages_concatenate_to_the_full_listing() {
    let store = test_store();
    for i in 0..7 {
        publish(store.as_ref(), &format!("Post number {}", i), &["Rust"]);
    }
    draft(store.as_ref(), "Hidden draft", PostStatus::Draft, &["Rust"]);

    let full = content::list_posts(
        store.as_ref(),
        &PostQuery { page_size: 100, ..Default::default() },
    )
    .unwrap();
    assert_eq!(full.total, 7);
    assert_eq!(full.posts.len(), 7);

    let mut paged = Vec::new();
    for page in 1..=3 {
        let q = PostQuery { page, page_size: 3, ..Default::default() };
        let result = content::list_posts(store.as_ref(), &q).unwrap();
        assert_eq!(result.total, 7);
        assert_eq!(result.total_pages, 3);
        paged.extend(result.posts.into_iter().map(|p| p.id));
    }
    let expected: Vec<i64> = full.posts.iter().map(|p| p.id).collect();
    assert_eq!(paged, expected);

    // Past the end: empty page, same total
    let beyond = content::list_posts(
        store.as_ref(),
        &PostQuery { page: 9, page_size: 3, ..Default::default() },
    )
    .unwrap();
    assert!(beyond.posts.is_empty());
    assert_eq!(beyond.total, 7);
}

#[test]
fn tag_filter_pages_newest_first() {
    let store = test_store();
    let first = publish(store.as_ref(), "Hooks in depth", &["React"]);
    publish(store.as_ref(), "Rust for web", &["Rust"]);
    let second = publish(store.as_ref(), "React Native tips", &["React", "Mobile"]);
    let third = publish(store.as_ref(), "Server components", &["React"]);

    let mut q = PostQuery { page: 1, page_size: 2, ..Default::default() };
    q.filter.tag = Some("React".to_string());
    let page = content::list_posts(store.as_ref(), &q).unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    let ids: Vec<i64> = page.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![third, second]);

    q.page = 2;
    let rest = content::list_posts(store.as_ref(), &q).unwrap();
    assert_eq!(rest.posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![first]);
}

#[test]
fn published_listing_never_includes_drafts_or_scheduled() {
    let store = test_store();
    publish(store.as_ref(), "Live", &[]);
    draft(store.as_ref(), "Work in progress", PostStatus::Draft, &[]);
    draft(store.as_ref(), "Coming soon", PostStatus::Scheduled, &[]);

    let page = content::list_posts(store.as_ref(), &PostQuery::default()).unwrap();
    assert_eq!(page.total, 1);
    assert!(page.posts.iter().all(|p| p.status == PostStatus::Published));

    let mut all = PostQuery::default();
    all.filter.status = StatusFilter::All;
    assert_eq!(content::list_posts(store.as_ref(), &all).unwrap().total, 3);
}

#[test]
fn update_post_recomputes_read_time_only_with_content() {
    let store = test_store();
    let id = publish(store.as_ref(), "Short", &[]);

    let rename = PostChanges { title: Some("Renamed".to_string()), ..Default::default() };
    content::update_post(store.as_ref(), id, &rename).unwrap();
    let post = content::get_post(store.as_ref(), id).unwrap().unwrap();
    assert_eq!(post.title, "Renamed");
    assert_eq!(post.read_time, 1);

    let longer = PostChanges { content: Some("word ".repeat(601)), ..Default::default() };
    content::update_post(store.as_ref(), id, &longer).unwrap();
    assert_eq!(content::get_post(store.as_ref(), id).unwrap().unwrap().read_time, 4);

    let bad_slug = PostChanges { slug: Some("---".to_string()), ..Default::default() };
    assert!(matches!(
        content::update_post(store.as_ref(), id, &bad_slug).unwrap_err(),
        Error::Validation(_)
    ));
}

#[test]
fn toggle_publish_flips_between_draft_and_published() {
    let store = test_store();
    let id = draft(store.as_ref(), "Toggle me", PostStatus::Scheduled, &[]);

    assert_eq!(content::toggle_publish(store.as_ref(), id).unwrap(), Some(PostStatus::Published));
    assert_eq!(content::toggle_publish(store.as_ref(), id).unwrap(), Some(PostStatus::Draft));
    assert_eq!(content::toggle_publish(store.as_ref(), 9999).unwrap(), None);
}

#[test]
fn tags_are_unique_and_from_published_posts_only() {
    let store = test_store();
    publish(store.as_ref(), "Oldest", &["SEO", "Web"]);
    draft(store.as_ref(), "Secret", PostStatus::Draft, &["Internal"]);
    publish(store.as_ref(), "Newest", &["React", "Web"]);

    let tags = content::list_all_tags(store.as_ref()).unwrap();
    assert_eq!(tags, vec!["React", "Web", "SEO"]);
}

#[test]
fn delete_post_removes_comments_and_views() {
    let store = test_store();
    let id = publish(store.as_ref(), "Doomed", &[]);
    engagement::submit_comment(store.as_ref(), id, &comment("Ann")).unwrap();
    content::record_view(store.as_ref(), id, None).unwrap();

    content::delete_post(store.as_ref(), id).unwrap();
    assert!(content::get_post(store.as_ref(), id).unwrap().is_none());
    assert!(engagement::list_all_comments(store.as_ref(), CommentFilter::All).unwrap().is_empty());
    assert_eq!(analytics::dashboard_stats(store.as_ref()).unwrap().total_views, 0);
}

#[test]
fn huge_page_number_is_an_empty_page() {
    let store = test_store();
    publish(store.as_ref(), "Only post", &[]);
    let q = PostQuery { page: i64::MAX, page_size: 100, ..Default::default() };
    let page = content::list_posts(store.as_ref(), &q).unwrap();
    assert!(page.posts.is_empty());
    assert_eq!(page.total, 1);
    assert_eq!(page.page, i64::MAX);

    let demo = DemoStore::new();
    let page = content::list_posts(&demo, &q).unwrap();
    assert!(page.posts.is_empty());
    assert_eq!(page.total, 5);
}

#[test]
fn slug_taken_by_another_post_is_conflict() {
    let store = test_store();
    publish(store.as_ref(), "First", &[]);
    let second = publish(store.as_ref(), "Second", &[]);

    let steal = PostChanges { slug: Some("first".to_string()), ..Default::default() };
    let err = content::update_post(store.as_ref(), second, &steal).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(err.status(), Status::Conflict);

    let dup = PostForm { title: "First".to_string(), ..Default::default() };
    assert!(matches!(
        content::create_post(store.as_ref(), &dup, None).unwrap_err(),
        Error::Conflict(_)
    ));
}

#[test]
fn updating_missing_rows_reports_false() {
    let store = test_store();
    let rename = PostChanges { title: Some("Nobody".to_string()), ..Default::default() };
    assert!(!content::update_post(store.as_ref(), 4242, &rename).unwrap());

    let id = publish(store.as_ref(), "Somebody", &[]);
    assert!(content::update_post(store.as_ref(), id, &rename).unwrap());

    let resort = crate::models::portfolio::ProjectChanges {
        sort_order: Some(2),
        ..Default::default()
    };
    assert!(!portfolio::update_project(store.as_ref(), 4242, &resort).unwrap());
}

// ═══════════════════════════════════════════════════════════
// Engagement repository
// ═══════════════════════════════════════════════════════════

#[test]
fn approve_moves_comment_from_pending_to_approved() {
    let store = test_store();
    let post_id = publish(store.as_ref(), "Discussed", &[]);
    let cid = engagement::submit_comment(store.as_ref(), post_id, &comment("Bea")).unwrap();

    let pending = engagement::list_all_comments(store.as_ref(), CommentFilter::Pending).unwrap();
    assert_eq!(pending.len(), 1);
    assert!(engagement::list_approved_comments(store.as_ref(), post_id).unwrap().is_empty());

    engagement::approve_comment(store.as_ref(), cid).unwrap();

    let approved = engagement::list_approved_comments(store.as_ref(), post_id).unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, cid);
    assert!(engagement::list_all_comments(store.as_ref(), CommentFilter::Pending)
        .unwrap()
        .is_empty());
    let listed = engagement::list_all_comments(store.as_ref(), CommentFilter::Approved).unwrap();
    assert_eq!(listed[0].post_slug.as_deref(), Some("discussed"));

    engagement::delete_comment(store.as_ref(), cid).unwrap();
    assert!(engagement::list_all_comments(store.as_ref(), CommentFilter::All).unwrap().is_empty());
}

#[test]
fn comment_fields_are_required() {
    let store = test_store();
    let post_id = publish(store.as_ref(), "Strict", &[]);
    let mut form = comment("Cal");
    form.author_name = "   ".to_string();
    assert!(matches!(
        engagement::submit_comment(store.as_ref(), post_id, &form).unwrap_err(),
        Error::Validation(_)
    ));

    let mut form = comment("Cal");
    form.author_email = "not-an-email".to_string();
    assert!(matches!(
        engagement::submit_comment(store.as_ref(), post_id, &form).unwrap_err(),
        Error::Validation(_)
    ));
}

#[test]
fn subscribing_twice_is_already_subscribed() {
    let store = test_store();
    engagement::subscribe(store.as_ref(), "reader@example.com").unwrap();
    let err = engagement::subscribe(store.as_ref(), "  Reader@Example.com ").unwrap_err();
    assert!(matches!(err, Error::AlreadySubscribed));
    assert_eq!(err.to_string(), "You're already subscribed!");

    let counts = engagement::count_subscribers(store.as_ref()).unwrap();
    assert_eq!(counts.total, 1);
    assert_eq!(counts.confirmed, 0);
}

#[test]
fn subscribe_rejects_malformed_address() {
    let store = test_store();
    assert!(matches!(
        engagement::subscribe(store.as_ref(), "nobody").unwrap_err(),
        Error::Validation(_)
    ));
}

#[test]
fn csv_export_with_one_subscriber() {
    let store = test_store();
    engagement::subscribe(store.as_ref(), "a@x.com").unwrap();
    let csv = engagement::export_subscribers_csv(store.as_ref()).unwrap();
    let lines: Vec<&str> = csv.split('\n').collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "email,confirmed,created_at");
    assert!(lines[1].starts_with("a@x.com,false,"));
    assert!(!csv.ends_with('\n'));
}

#[test]
fn contact_messages_flow() {
    let store = test_store();
    let form = ContactForm {
        name: " Dana ".to_string(),
        email: "dana@example.com".to_string(),
        subject: "Quote".to_string(),
        message: "We need a new site".to_string(),
    };
    let id = engagement::submit_contact_message(store.as_ref(), &form).unwrap();
    let messages = engagement::list_contact_messages(store.as_ref()).unwrap();
    assert_eq!(messages[0].name, "Dana");
    assert!(!messages[0].read);

    engagement::mark_message_read(store.as_ref(), id).unwrap();
    assert!(engagement::list_contact_messages(store.as_ref()).unwrap()[0].read);

    let mut missing = form.clone();
    missing.subject = String::new();
    assert!(matches!(
        engagement::submit_contact_message(store.as_ref(), &missing).unwrap_err(),
        Error::Validation(_)
    ));
}

// ═══════════════════════════════════════════════════════════
// Portfolio repository
// ═══════════════════════════════════════════════════════════

fn project(title: &str, category: &str, sort_order: i64, featured: bool) -> ProjectForm {
    ProjectForm {
        title: title.to_string(),
        category: category.to_string(),
        sort_order,
        featured,
        ..Default::default()
    }
}

#[test]
fn portfolio_listing_and_categories() {
    let store = test_store();
    portfolio::create_project(store.as_ref(), &project("Shop", "Web", 2, true)).unwrap();
    portfolio::create_project(store.as_ref(), &project("App", "Mobile", 1, true)).unwrap();
    portfolio::create_project(store.as_ref(), &project("Blog", "Web", 3, true)).unwrap();
    portfolio::create_project(store.as_ref(), &project("Audit", "SEO", 4, true)).unwrap();

    let titles = |c: Option<&str>| -> Vec<String> {
        portfolio::list_projects(store.as_ref(), c)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect()
    };
    assert_eq!(titles(None), vec!["App", "Shop", "Blog", "Audit"]);
    assert_eq!(titles(Some("All")), titles(None));
    assert_eq!(titles(Some("Web")), vec!["Shop", "Blog"]);

    let featured = portfolio::list_featured_projects(store.as_ref(), None).unwrap();
    assert_eq!(featured.len(), 3);

    let categories = portfolio::list_project_categories(store.as_ref()).unwrap();
    assert_eq!(categories, vec!["All", "Mobile", "Web", "SEO"]);

    let missing = project("X", "  ", 0, false);
    assert!(portfolio::create_project(store.as_ref(), &missing).is_err());
}

// ═══════════════════════════════════════════════════════════
// Analytics
// ═══════════════════════════════════════════════════════════

#[test]
fn analytics_counts_and_rankings() {
    let store = test_store();
    let a = publish(store.as_ref(), "Alpha", &[]);
    let b = publish(store.as_ref(), "Beta", &[]);
    let c = draft(store.as_ref(), "Gamma", PostStatus::Draft, &[]);
    for _ in 0..3 {
        content::record_view(store.as_ref(), b, Some("https://www.google.com/search")).unwrap();
    }
    content::record_view(store.as_ref(), a, None).unwrap();
    engagement::subscribe(store.as_ref(), "s@x.com").unwrap();

    let stats = analytics::dashboard_stats(store.as_ref()).unwrap();
    assert_eq!(stats.total_posts, 3);
    assert_eq!(stats.total_views, 4);
    assert_eq!(stats.total_subscribers, 1);
    assert_eq!(stats.total_messages, 0);

    let top = analytics::top_posts(store.as_ref(), 5).unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!((top[0].id, top[0].views), (b, 3));
    assert_eq!((top[1].id, top[1].views), (a, 1));
    assert_eq!(analytics::top_posts(store.as_ref(), 1).unwrap().len(), 1);

    let recent = analytics::recent_posts(store.as_ref(), None).unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].id, c);
    assert_eq!(recent[0].status, "draft");
    assert_eq!(recent[1].views, 3);
}

#[test]
fn views_over_time_ends_today_with_todays_views() {
    let store = test_store();
    let id = publish(store.as_ref(), "Counted", &[]);
    content::record_view(store.as_ref(), id, None).unwrap();
    content::record_view(store.as_ref(), id, None).unwrap();

    let series = analytics::views_over_time(store.as_ref(), 7).unwrap();
    assert_eq!(series.len(), 7);
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(series[6].date, today);
    assert_eq!(series[6].views, 2);
    assert_eq!(series.iter().map(|d| d.views).sum::<i64>(), 2);

    let growth = analytics::subscriber_growth(store.as_ref(), 30).unwrap();
    assert_eq!(growth.len(), 30);
    assert!(growth.iter().all(|d| d.views == 0));
}

#[test]
fn demo_recent_posts_report_real_view_counts() {
    let store = DemoStore::new();
    let recent = analytics::recent_posts(&store, Some(5)).unwrap();
    assert_eq!(recent.len(), 5);
    for r in &recent {
        assert_eq!(r.views, store.post_view_count_for(r.id).unwrap());
    }
    let top = analytics::top_posts(&store, 3).unwrap();
    assert_eq!(top[0].id, 1);
    assert!(top.windows(2).all(|w| w[0].views >= w[1].views));
}

#[test]
fn daily_series_window_is_clamped() {
    let store = test_store();
    assert_eq!(analytics::views_over_time(store.as_ref(), i64::MAX).unwrap().len(), 365);
    assert_eq!(analytics::views_over_time(store.as_ref(), 0).unwrap().len(), 1);
    assert_eq!(analytics::subscriber_growth(store.as_ref(), i64::MAX).unwrap().len(), 365);
    assert_eq!(analytics::subscriber_growth(store.as_ref(), -5).unwrap().len(), 1);
}

// ═══════════════════════════════════════════════════════════
// Authentication
// ═══════════════════════════════════════════════════════════

#[test]
fn login_logout_roundtrip() {
    let store = test_store();
    let config = test_config();
    seed_operator(store.as_ref());

    let (user, token) =
        auth::login(store.as_ref(), &config, " OP@modarntech.com ", "correct horse").unwrap();
    assert_eq!(user.email, "op@modarntech.com");
    assert_eq!(
        auth::current_user(store.as_ref(), &token).unwrap().map(|u| u.id),
        Some(user.id)
    );

    auth::logout(store.as_ref(), &token).unwrap();
    assert!(auth::current_user(store.as_ref(), &token).unwrap().is_none());

    let err = auth::login(store.as_ref(), &config, "op@modarntech.com", "wrong").unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
    let err = auth::login(store.as_ref(), &config, "nobody@x.com", "x").unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
}

#[test]
fn auth_is_unavailable_in_demo_mode() {
    let store = DemoStore::new();
    let config = test_config();
    assert!(matches!(
        auth::login(&store, &config, "admin@modarntech.com", "x").unwrap_err(),
        Error::NotConnected
    ));
    assert!(matches!(
        password_reset::request_reset(&store, &config, "admin@modarntech.com").unwrap_err(),
        Error::NotConnected
    ));
}

#[test]
fn password_reset_is_single_use_and_ends_sessions() {
    let store = test_store();
    let config = test_config();
    seed_operator(store.as_ref());
    let (_, session) =
        auth::login(store.as_ref(), &config, "op@modarntech.com", "correct horse").unwrap();

    assert_eq!(password_reset::create_token(store.as_ref(), "ghost@x.com").unwrap(), None);
    let token = password_reset::create_token(store.as_ref(), "op@modarntech.com")
        .unwrap()
        .unwrap();

    assert!(matches!(
        password_reset::confirm_reset(store.as_ref(), &token, "short").unwrap_err(),
        Error::Validation(_)
    ));
    password_reset::confirm_reset(store.as_ref(), &token, "brand new password").unwrap();

    assert!(auth::current_user(store.as_ref(), &session).unwrap().is_none());
    assert!(auth::login(store.as_ref(), &config, "op@modarntech.com", "brand new password").is_ok());
    assert!(matches!(
        password_reset::confirm_reset(store.as_ref(), &token, "another password").unwrap_err(),
        Error::InvalidToken
    ));
}

#[test]
fn boot_seeds_operator_once() {
    let store = test_store();
    let mut config = test_config();
    config.operator.email = Some("boss@modarntech.com".to_string());
    config.operator.password = Some("initial password".to_string());

    boot::prepare(store.as_ref(), &config).unwrap();
    boot::prepare(store.as_ref(), &config).unwrap();
    assert_eq!(store.user_count().unwrap(), 1);
    assert!(auth::login(store.as_ref(), &config, "boss@modarntech.com", "initial password").is_ok());
}

#[test]
fn select_store_without_database_is_demo() {
    let store = boot::select_store(&test_config()).unwrap();
    assert!(store.is_demo());
}

// ═══════════════════════════════════════════════════════════
// HTTP routes
// ═══════════════════════════════════════════════════════════

fn client(store: Arc<dyn Store>) -> Client {
    Client::tracked(crate::build_rocket(test_config(), store)).expect("valid rocket instance")
}

#[test]
fn demo_mode_serves_public_and_operator_routes() {
    let client = client(Arc::new(DemoStore::new()));

    let res = client.get("/api/posts?limit=2").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["total"], 5);
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_pages"], 3);

    // Operator routes are open in demo mode
    let res = client.get("/cms/api/analytics/stats").dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(
        res.headers().get_one("Cache-Control"),
        Some("no-store, no-cache, must-revalidate, max-age=0")
    );

    // Writes report success
    let res = client
        .post("/api/newsletter")
        .header(ContentType::JSON)
        .body(r#"{"email":"visitor@example.com"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["success"], true);
}

#[test]
fn demo_mode_hides_unpublished_posts() {
    let client = client(Arc::new(DemoStore::new()));
    let res = client.get("/api/posts/why-we-moved-to-postgresql").dispatch();
    assert_eq!(res.status(), Status::NotFound);
    let res = client.get("/api/posts/practical-guide-to-technical-seo").dispatch();
    assert_eq!(res.status(), Status::Ok);
}

#[test]
fn operator_routes_require_a_session() {
    let store = test_store();
    seed_operator(store.as_ref());
    let client = client(store);

    let res = client.get("/cms/api/posts").dispatch();
    assert_eq!(res.status(), Status::Unauthorized);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["success"], false);

    let res = client
        .post("/auth/login")
        .header(ContentType::JSON)
        .body(r#"{"email":"op@modarntech.com","password":"wrong"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Unauthorized);

    let res = client
        .post("/auth/login")
        .header(ContentType::JSON)
        .body(r#"{"email":"op@modarntech.com","password":"correct horse"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Ok);

    let res = client.get("/cms/api/posts").dispatch();
    assert_eq!(res.status(), Status::Ok);

    let res = client.get("/auth/me").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let me: serde_json::Value = res.into_json().unwrap();
    assert_eq!(me["email"], "op@modarntech.com");
    assert!(me.get("password_hash").is_none());

    client.post("/auth/logout").dispatch();
    let res = client.get("/cms/api/posts").dispatch();
    assert_eq!(res.status(), Status::Unauthorized);
}

#[test]
fn operator_can_publish_and_visitors_can_read() {
    let store = test_store();
    seed_operator(store.as_ref());
    let client = client(store);
    client
        .post("/auth/login")
        .header(ContentType::JSON)
        .body(r#"{"email":"op@modarntech.com","password":"correct horse"}"#)
        .dispatch();

    let res = client
        .post("/cms/api/posts")
        .header(ContentType::JSON)
        .body(r#"{"title":"Hello Jinja","content":"First post","tags":["News"]}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let created: serde_json::Value = res.into_json().unwrap();
    let id = created["id"].as_i64().unwrap();

    assert_eq!(client.get("/api/posts/hello-jinja").dispatch().status(), Status::NotFound);

    let res = client.post(format!("/cms/api/posts/{}/toggle-publish", id)).dispatch();
    let toggled: serde_json::Value = res.into_json().unwrap();
    assert_eq!(toggled["status"], "published");

    let res = client
        .get("/api/posts/hello-jinja")
        .header(rocket::http::Header::new("Referer", "https://twitter.com/some/thread"))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let post: serde_json::Value = res.into_json().unwrap();
    assert_eq!(post["author_name"], "Operator");

    let tags: Vec<String> = client.get("/api/tags").dispatch().into_json().unwrap();
    assert_eq!(tags, vec!["News"]);

    let stats: serde_json::Value =
        client.get("/cms/api/analytics/stats").dispatch().into_json().unwrap();
    assert_eq!(stats["total_views"], 1);
}

#[test]
fn newsletter_duplicate_and_csv_export() {
    let store = test_store();
    seed_operator(store.as_ref());
    let client = client(store);

    let subscribe = || {
        client
            .post("/api/newsletter")
            .header(ContentType::JSON)
            .body(r#"{"email":"fan@example.com"}"#)
            .dispatch()
    };
    assert_eq!(subscribe().status(), Status::Ok);
    let res = subscribe();
    assert_eq!(res.status(), Status::Conflict);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["error"], "You're already subscribed!");

    client
        .post("/auth/login")
        .header(ContentType::JSON)
        .body(r#"{"email":"op@modarntech.com","password":"correct horse"}"#)
        .dispatch();
    let res = client.get("/cms/api/newsletter/export").dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert!(res.headers().get_one("Content-Type").unwrap().starts_with("text/csv"));
    assert!(res
        .headers()
        .get_one("Content-Disposition")
        .unwrap()
        .contains("subscribers.csv"));
    let csv = res.into_string().unwrap();
    assert!(csv.starts_with("email,confirmed,created_at\nfan@example.com,false,"));
}

#[test]
fn unknown_route_answers_json_404() {
    let client = client(Arc::new(DemoStore::new()));
    let res = client.get("/api/does-not-exist").dispatch();
    assert_eq!(res.status(), Status::NotFound);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["error"], "Not found");
}

#[test]
fn out_of_range_page_answers_empty_listing() {
    let client = client(Arc::new(DemoStore::new()));
    let res = client.get("/api/posts?page=9223372036854775807&limit=50").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["posts"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 5);
}

#[test]
fn operator_site_serves_cms_navigation() {
    let client = client(Arc::new(DemoStore::new()));
    let res = client.get("/cms/api/site").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    let nav = body["nav_links"].as_array().unwrap();
    assert_eq!(nav.len(), 6);
    assert_eq!(nav[0]["href"], "/cms");
    assert!(body["user"].is_null());

    let public: serde_json::Value = client.get("/api/site").dispatch().into_json().unwrap();
    assert!(public.get("cms_nav_links").is_none());
}

#[test]
fn operator_updates_answer_404_and_409() {
    let store = test_store();
    seed_operator(store.as_ref());
    publish(store.as_ref(), "Taken", &[]);
    let other = publish(store.as_ref(), "Free", &[]);
    let client = client(store);
    client
        .post("/auth/login")
        .header(ContentType::JSON)
        .body(r#"{"email":"op@modarntech.com","password":"correct horse"}"#)
        .dispatch();

    let res = client
        .put("/cms/api/posts/4242")
        .header(ContentType::JSON)
        .body(r#"{"title":"Ghost"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::NotFound);

    let res = client
        .put("/cms/api/projects/4242")
        .header(ContentType::JSON)
        .body(r#"{"sort_order":1}"#)
        .dispatch();
    assert_eq!(res.status(), Status::NotFound);

    let res = client
        .put(format!("/cms/api/posts/{}", other))
        .header(ContentType::JSON)
        .body(r#"{"slug":"taken"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Conflict);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["success"], false);
}
