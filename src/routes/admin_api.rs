use std::sync::Arc;

use rocket::http::Header;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use super::{fail, not_found, post_query, success, ApiResult};
use crate::analytics;
use crate::config::SiteConfig;
use crate::error::Error;
use crate::models::analytics::{DailyViews, DashboardStats, RecentPost, TopPost};
use crate::models::comment::{Comment, CommentFilter};
use crate::models::contact::ContactMessage;
use crate::models::newsletter::{Subscriber, SubscriberCount};
use crate::models::portfolio::{ProjectChanges, ProjectForm};
use crate::models::post::{Post, PostChanges, PostForm, PostPage, StatusFilter};
use crate::security::auth::OperatorSession;
use crate::store::Store;
use crate::{content, engagement, portfolio};

const DEFAULT_DAYS: i64 = 30;
const DEFAULT_TOP_POSTS: i64 = 5;

fn days_param(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_DAYS).clamp(1, analytics::MAX_DAYS)
}

// ── Shell ──────────────────────────────────────────────

/// Operator navigation and the signed-in user (`null` in demo mode).
#[get("/site")]
pub fn operator_site(op: OperatorSession, config: &State<SiteConfig>) -> ApiResult<Value> {
    Ok(Json(json!({
        "site": config.site,
        "nav_links": config.cms_nav_links,
        "user": op.user,
    })))
}

// ── Posts ──────────────────────────────────────────────

#[get("/posts?<search>&<tag>&<status>&<page>&<limit>")]
pub fn posts_list(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    search: Option<&str>,
    tag: Option<&str>,
    status: Option<&str>,
    page: Option<i64>,
    limit: Option<i64>,
) -> ApiResult<PostPage> {
    let status = match status {
        Some(s) => s.parse::<StatusFilter>().map_err(fail)?,
        None => StatusFilter::All,
    };
    let query = post_query(search, tag, status, page, limit);
    content::list_posts(store.inner().as_ref(), &query)
        .map(Json)
        .map_err(fail)
}

#[get("/posts/<id>")]
pub fn post_get(_op: OperatorSession, store: &State<Arc<dyn Store>>, id: i64) -> ApiResult<Post> {
    content::get_post(store.inner().as_ref(), id)
        .map_err(fail)?
        .map(Json)
        .ok_or_else(|| not_found("Post"))
}

#[post("/posts", format = "json", data = "<form>")]
pub fn post_create(
    op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    form: Json<PostForm>,
) -> ApiResult<Value> {
    let author_id = op.user.as_ref().map(|u| u.id);
    let id = content::create_post(store.inner().as_ref(), &form, author_id).map_err(fail)?;
    Ok(Json(json!({ "success": true, "id": id })))
}

#[put("/posts/<id>", format = "json", data = "<changes>")]
pub fn post_update(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    changes: Json<PostChanges>,
) -> ApiResult<Value> {
    if !content::update_post(store.inner().as_ref(), id, &changes).map_err(fail)? {
        return Err(not_found("Post"));
    }
    Ok(success())
}

#[delete("/posts/<id>")]
pub fn post_delete(_op: OperatorSession, store: &State<Arc<dyn Store>>, id: i64) -> ApiResult<Value> {
    content::delete_post(store.inner().as_ref(), id).map_err(fail)?;
    Ok(success())
}

#[post("/posts/<id>/toggle-publish")]
pub fn post_toggle_publish(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
) -> ApiResult<Value> {
    match content::toggle_publish(store.inner().as_ref(), id).map_err(fail)? {
        Some(status) => Ok(Json(json!({ "success": true, "status": status }))),
        None => Err(not_found("Post")),
    }
}

// ── Comments ───────────────────────────────────────────

#[get("/comments?<filter>")]
pub fn comments_list(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    filter: Option<&str>,
) -> ApiResult<Vec<Comment>> {
    let filter = match filter {
        Some(f) => f.parse::<CommentFilter>().map_err(fail)?,
        None => CommentFilter::All,
    };
    engagement::list_all_comments(store.inner().as_ref(), filter)
        .map(Json)
        .map_err(fail)
}

#[post("/comments/<id>/approve")]
pub fn comment_approve(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
) -> ApiResult<Value> {
    engagement::approve_comment(store.inner().as_ref(), id).map_err(fail)?;
    Ok(success())
}

#[delete("/comments/<id>")]
pub fn comment_delete(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
) -> ApiResult<Value> {
    engagement::delete_comment(store.inner().as_ref(), id).map_err(fail)?;
    Ok(success())
}

// ── Newsletter ─────────────────────────────────────────

#[get("/newsletter")]
pub fn subscribers_list(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
) -> ApiResult<Vec<Subscriber>> {
    engagement::list_subscribers(store.inner().as_ref())
        .map(Json)
        .map_err(fail)
}

#[get("/newsletter/count")]
pub fn subscribers_count(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
) -> ApiResult<SubscriberCount> {
    engagement::count_subscribers(store.inner().as_ref())
        .map(Json)
        .map_err(fail)
}

/// CSV download of the subscriber list.
#[derive(Responder)]
#[response(content_type = "text/csv")]
pub struct CsvExport {
    body: String,
    disposition: Header<'static>,
}

#[get("/newsletter/export")]
pub fn subscribers_export(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
) -> Result<CsvExport, super::ApiError> {
    let body = engagement::export_subscribers_csv(store.inner().as_ref()).map_err(fail)?;
    Ok(CsvExport {
        body,
        disposition: Header::new(
            "Content-Disposition",
            "attachment; filename=\"subscribers.csv\"",
        ),
    })
}

// ── Contact messages ───────────────────────────────────

#[get("/messages")]
pub fn messages_list(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
) -> ApiResult<Vec<ContactMessage>> {
    engagement::list_contact_messages(store.inner().as_ref())
        .map(Json)
        .map_err(fail)
}

#[post("/messages/<id>/read")]
pub fn message_mark_read(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
) -> ApiResult<Value> {
    engagement::mark_message_read(store.inner().as_ref(), id).map_err(fail)?;
    Ok(success())
}

// ── Portfolio ──────────────────────────────────────────

#[post("/projects", format = "json", data = "<form>")]
pub fn project_create(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    form: Json<ProjectForm>,
) -> ApiResult<Value> {
    let id = portfolio::create_project(store.inner().as_ref(), &form).map_err(fail)?;
    Ok(Json(json!({ "success": true, "id": id })))
}

#[put("/projects/<id>", format = "json", data = "<changes>")]
pub fn project_update(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    changes: Json<ProjectChanges>,
) -> ApiResult<Value> {
    if !portfolio::update_project(store.inner().as_ref(), id, &changes).map_err(fail)? {
        return Err(not_found("Project"));
    }
    Ok(success())
}

#[delete("/projects/<id>")]
pub fn project_delete(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
) -> ApiResult<Value> {
    portfolio::delete_project(store.inner().as_ref(), id).map_err(fail)?;
    Ok(success())
}

// ── Analytics ──────────────────────────────────────────

#[get("/analytics/stats")]
pub fn stats(_op: OperatorSession, store: &State<Arc<dyn Store>>) -> ApiResult<DashboardStats> {
    analytics::dashboard_stats(store.inner().as_ref())
        .map(Json)
        .map_err(fail)
}

#[get("/analytics/views?<days>")]
pub fn views(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    days: Option<i64>,
) -> ApiResult<Vec<DailyViews>> {
    analytics::views_over_time(store.inner().as_ref(), days_param(days))
        .map(Json)
        .map_err(fail)
}

#[get("/analytics/subscribers?<days>")]
pub fn subscriber_growth(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    days: Option<i64>,
) -> ApiResult<Vec<DailyViews>> {
    analytics::subscriber_growth(store.inner().as_ref(), days_param(days))
        .map(Json)
        .map_err(fail)
}

#[get("/analytics/top?<limit>")]
pub fn top_posts(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    limit: Option<i64>,
) -> ApiResult<Vec<TopPost>> {
    let limit = limit.unwrap_or(DEFAULT_TOP_POSTS);
    if limit < 0 {
        return Err(fail(Error::Validation("limit must not be negative".to_string())));
    }
    analytics::top_posts(store.inner().as_ref(), limit)
        .map(Json)
        .map_err(fail)
}

#[get("/analytics/recent?<limit>")]
pub fn recent_posts(
    _op: OperatorSession,
    store: &State<Arc<dyn Store>>,
    limit: Option<i64>,
) -> ApiResult<Vec<RecentPost>> {
    analytics::recent_posts(store.inner().as_ref(), limit)
        .map(Json)
        .map_err(fail)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        operator_site,
        posts_list,
        post_get,
        post_create,
        post_update,
        post_delete,
        post_toggle_publish,
        comments_list,
        comment_approve,
        comment_delete,
        subscribers_list,
        subscribers_count,
        subscribers_export,
        messages_list,
        message_mark_read,
        project_create,
        project_update,
        project_delete,
        stats,
        views,
        subscriber_growth,
        top_posts,
        recent_posts,
    ]
}
