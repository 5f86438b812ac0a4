use std::sync::Arc;

use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use super::{fail, success, ApiResult};
use crate::config::SiteConfig;
use crate::models::user::{LoginForm, ResetConfirmForm, ResetRequestForm, User};
use crate::security::{auth, password_reset};
use crate::store::Store;

#[post("/login", format = "json", data = "<form>")]
pub fn login(
    form: Json<LoginForm>,
    store: &State<Arc<dyn Store>>,
    config: &State<SiteConfig>,
    cookies: &CookieJar<'_>,
) -> ApiResult<Value> {
    let (user, token) =
        auth::login(store.inner().as_ref(), config, &form.email, &form.password).map_err(fail)?;
    auth::set_session_cookie(cookies, &token, config);
    Ok(Json(json!({ "success": true, "user": user })))
}

#[post("/logout")]
pub fn logout(store: &State<Arc<dyn Store>>, cookies: &CookieJar<'_>) -> ApiResult<Value> {
    if let Some(token) = auth::session_token(cookies) {
        auth::logout(store.inner().as_ref(), &token).map_err(fail)?;
    }
    auth::clear_session_cookie(cookies);
    Ok(success())
}

#[get("/me")]
pub fn me(store: &State<Arc<dyn Store>>, cookies: &CookieJar<'_>) -> ApiResult<User> {
    let user = match auth::session_token(cookies) {
        Some(token) => auth::current_user(store.inner().as_ref(), &token).map_err(fail)?,
        None => None,
    };
    user.map(Json).ok_or_else(|| {
        (
            Status::Unauthorized,
            Json(json!({ "success": false, "error": "Not signed in" })),
        )
    })
}

/// Always answers success for a known or unknown address.
#[post("/reset-password", format = "json", data = "<form>")]
pub fn reset_request(
    form: Json<ResetRequestForm>,
    store: &State<Arc<dyn Store>>,
    config: &State<SiteConfig>,
) -> ApiResult<Value> {
    password_reset::request_reset(store.inner().as_ref(), config, &form.email).map_err(fail)?;
    Ok(success())
}

#[post("/reset-password/confirm", format = "json", data = "<form>")]
pub fn reset_confirm(
    form: Json<ResetConfirmForm>,
    store: &State<Arc<dyn Store>>,
    cookies: &CookieJar<'_>,
) -> ApiResult<Value> {
    password_reset::confirm_reset(store.inner().as_ref(), &form.token, &form.password)
        .map_err(fail)?;
    auth::clear_session_cookie(cookies);
    Ok(success())
}

pub fn routes() -> Vec<rocket::Route> {
    routes![login, logout, me, reset_request, reset_confirm]
}
