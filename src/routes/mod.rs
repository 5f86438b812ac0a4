pub mod admin_api;
pub mod api;
pub mod auth;

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::json::Json;
use serde_json::{json, Value};

use crate::error::Error;
use crate::models::post::{PostFilter, PostQuery, StatusFilter, DEFAULT_PAGE_SIZE};

/// Failure body shared by every JSON route: `{"success": false, "error": ...}`.
pub type ApiError = (Status, Json<Value>);

pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn fail(e: Error) -> ApiError {
    (e.status(), Json(json!({ "success": false, "error": e.to_string() })))
}

pub fn not_found(what: &str) -> ApiError {
    (
        Status::NotFound,
        Json(json!({ "success": false, "error": format!("{} not found", what) })),
    )
}

pub fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Build a listing query from raw query-string values. Blank strings count
/// as absent.
pub fn post_query(
    search: Option<&str>,
    tag: Option<&str>,
    status: StatusFilter,
    page: Option<i64>,
    limit: Option<i64>,
) -> PostQuery {
    let present = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    PostQuery {
        filter: PostFilter {
            search: present(search),
            tag: present(tag),
            status,
        },
        page: page.unwrap_or(1),
        page_size: limit.unwrap_or(DEFAULT_PAGE_SIZE),
    }
}

/// The `Referer` request header, if any.
pub struct Referrer(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Referrer {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let referrer = request.headers().get_one("Referer").map(|s| s.to_string());
        Outcome::Success(Referrer(referrer))
    }
}
