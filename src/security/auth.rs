use std::sync::Arc;

use chrono::{Duration, Utc};
use log::{info, warn};
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::store::Store;

pub const SESSION_COOKIE: &str = "modarntech_session";

#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

// ── Operator guard ──

/// Guard for the operator API. Requires a live session, except in demo mode
/// where every request is let through and `user` is `None`.
pub struct OperatorSession {
    pub user: Option<User>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OperatorSession {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let store = match request.guard::<&State<Arc<dyn Store>>>().await {
            Outcome::Success(s) => s,
            _ => return Outcome::Forward(Status::Unauthorized),
        };
        if store.is_demo() {
            return Outcome::Success(OperatorSession { user: None });
        }

        match resolve_session_user(store.inner().as_ref(), request.cookies()) {
            Some(user) => Outcome::Success(OperatorSession { user: Some(user) }),
            None => Outcome::Forward(Status::Unauthorized),
        }
    }
}

fn resolve_session_user(store: &dyn Store, cookies: &CookieJar<'_>) -> Option<User> {
    let token = cookies.get_private(SESSION_COOKIE)?.value().to_string();
    match store.session_get_user(&token) {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            cookies.remove_private(Cookie::from(SESSION_COOKIE));
            None
        }
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            None
        }
    }
}

// ── Password utilities ──

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| Error::Backend(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// ── Sign-in / sign-out ──

/// Check credentials and open a session. Returns the user and session token.
pub fn login(
    store: &dyn Store,
    config: &SiteConfig,
    email: &str,
    password: &str,
) -> Result<(User, String)> {
    if store.is_demo() {
        return Err(Error::NotConnected);
    }
    let email = email.trim();
    let user = match store.user_get_by_email(email)? {
        Some(u) if verify_password(password, &u.password_hash) => u,
        _ => {
            warn!("Failed login for {}", email);
            return Err(Error::InvalidCredentials);
        }
    };

    let token = uuid::Uuid::new_v4().to_string();
    let expires = Utc::now().naive_utc() + Duration::hours(config.session_hours());
    store.session_create(user.id, &token, expires)?;
    info!("Operator signed in: {}", user.email);
    Ok((user, token))
}

pub fn logout(store: &dyn Store, token: &str) -> Result<()> {
    store.session_delete(token)
}

/// The operator behind a session token, if the session is still valid.
pub fn current_user(store: &dyn Store, token: &str) -> Result<Option<User>> {
    if store.is_demo() {
        return Ok(None);
    }
    store.session_get_user(token)
}

pub fn session_token(cookies: &CookieJar<'_>) -> Option<String> {
    cookies.get_private(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Set the session cookie. `Secure` is on whenever the site is served over HTTPS.
pub fn set_session_cookie(cookies: &CookieJar<'_>, token: &str, config: &SiteConfig) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if config.site.url.starts_with("https://") {
        cookie.set_secure(true);
    }
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}

/// Create the first operator from config when no user exists yet.
pub fn seed_operator(store: &dyn Store, config: &SiteConfig) -> Result<()> {
    if store.is_demo() || store.user_count()? > 0 {
        return Ok(());
    }
    let (Some(email), Some(password)) = (&config.operator.email, &config.operator.password) else {
        warn!("No operators exist; set OPERATOR_EMAIL and OPERATOR_PASSWORD to create one");
        return Ok(());
    };
    let hash = hash_password(password)?;
    store.user_create(email.trim(), &hash, config.operator.name.as_deref(), "admin")?;
    info!("Created initial operator {}", email.trim());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-bcrypt-hash"));
    }
}
