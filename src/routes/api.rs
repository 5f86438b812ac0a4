use std::sync::Arc;

use log::warn;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use super::{fail, not_found, post_query, success, ApiResult, Referrer};
use crate::config::SiteConfig;
use crate::models::comment::{Comment, CommentForm};
use crate::models::contact::ContactForm;
use crate::models::newsletter::SubscribeForm;
use crate::models::portfolio::Project;
use crate::models::post::{Post, PostPage, PostStatus, StatusFilter};
use crate::store::Store;
use crate::{content, engagement, portfolio};

// ── Posts ──────────────────────────────────────────────

#[get("/posts?<search>&<tag>&<page>&<limit>")]
pub fn posts_list(
    store: &State<Arc<dyn Store>>,
    search: Option<&str>,
    tag: Option<&str>,
    page: Option<i64>,
    limit: Option<i64>,
) -> ApiResult<PostPage> {
    let query = post_query(search, tag, StatusFilter::default(), page, limit);
    content::list_posts(store.inner().as_ref(), &query)
        .map(Json)
        .map_err(fail)
}

/// A published post by slug. Each successful fetch counts as a view.
#[get("/posts/<slug>")]
pub fn post_by_slug(
    store: &State<Arc<dyn Store>>,
    slug: &str,
    referrer: Referrer,
) -> ApiResult<Post> {
    let store = store.inner().as_ref();
    let post = match content::get_post_by_slug(store, slug).map_err(fail)? {
        Some(p) if p.status == PostStatus::Published => p,
        _ => return Err(not_found("Post")),
    };
    if let Err(e) = content::record_view(store, post.id, referrer.0.as_deref()) {
        warn!("View not recorded for {}: {}", post.slug, e);
    }
    Ok(Json(post))
}

#[get("/tags")]
pub fn tags(store: &State<Arc<dyn Store>>) -> ApiResult<Vec<String>> {
    content::list_all_tags(store.inner().as_ref())
        .map(Json)
        .map_err(fail)
}

// ── Comments ───────────────────────────────────────────

#[get("/posts/<id>/comments")]
pub fn comments_list(store: &State<Arc<dyn Store>>, id: i64) -> ApiResult<Vec<Comment>> {
    engagement::list_approved_comments(store.inner().as_ref(), id)
        .map(Json)
        .map_err(fail)
}

#[post("/posts/<id>/comments", format = "json", data = "<form>")]
pub fn comment_submit(
    store: &State<Arc<dyn Store>>,
    id: i64,
    form: Json<CommentForm>,
) -> ApiResult<Value> {
    let store = store.inner().as_ref();
    match content::get_post(store, id).map_err(fail)? {
        Some(p) if p.status == PostStatus::Published => {}
        _ => return Err(not_found("Post")),
    }
    engagement::submit_comment(store, id, &form).map_err(fail)?;
    Ok(Json(json!({
        "success": true,
        "message": "Comment submitted and awaiting moderation",
    })))
}

// ── Newsletter / contact ───────────────────────────────

#[post("/newsletter", format = "json", data = "<form>")]
pub fn newsletter_subscribe(
    store: &State<Arc<dyn Store>>,
    form: Json<SubscribeForm>,
) -> ApiResult<Value> {
    engagement::subscribe(store.inner().as_ref(), &form.email).map_err(fail)?;
    Ok(success())
}

#[post("/contact", format = "json", data = "<form>")]
pub fn contact_submit(store: &State<Arc<dyn Store>>, form: Json<ContactForm>) -> ApiResult<Value> {
    engagement::submit_contact_message(store.inner().as_ref(), &form).map_err(fail)?;
    Ok(success())
}

// ── Portfolio ──────────────────────────────────────────

#[get("/projects?<category>")]
pub fn projects_list(
    store: &State<Arc<dyn Store>>,
    category: Option<&str>,
) -> ApiResult<Vec<Project>> {
    portfolio::list_projects(store.inner().as_ref(), category)
        .map(Json)
        .map_err(fail)
}

#[get("/projects/featured?<limit>")]
pub fn projects_featured(
    store: &State<Arc<dyn Store>>,
    limit: Option<i64>,
) -> ApiResult<Vec<Project>> {
    portfolio::list_featured_projects(store.inner().as_ref(), limit)
        .map(Json)
        .map_err(fail)
}

#[get("/projects/categories")]
pub fn project_categories(store: &State<Arc<dyn Store>>) -> ApiResult<Vec<String>> {
    portfolio::list_project_categories(store.inner().as_ref())
        .map(Json)
        .map_err(fail)
}

// ── Site ───────────────────────────────────────────────

#[get("/site")]
pub fn site(config: &State<SiteConfig>) -> ApiResult<Value> {
    serde_json::to_value(config.public())
        .map(Json)
        .map_err(|e| fail(e.into()))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        posts_list,
        post_by_slug,
        tags,
        comments_list,
        comment_submit,
        newsletter_subscribe,
        contact_submit,
        projects_list,
        projects_featured,
        project_categories,
        site,
    ]
}
