use chrono::{Duration, Utc};
use log::{debug, info};
use sha2::{Digest, Sha256};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::store::Store;

/// Lifetime of a reset link.
pub const RESET_TOKEN_MINUTES: i64 = 30;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Only the SHA-256 of a reset token is stored.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a reset token for `email`. Returns `None` when no operator has that
/// address, so callers can answer the same way either way.
pub fn create_token(store: &dyn Store, email: &str) -> Result<Option<String>> {
    if store.is_demo() {
        return Err(Error::NotConnected);
    }
    let email = email.trim();
    if store.user_get_by_email(email)?.is_none() {
        return Ok(None);
    }
    let token = uuid::Uuid::new_v4().to_string();
    let expires = Utc::now().naive_utc() + Duration::minutes(RESET_TOKEN_MINUTES);
    store.reset_token_create(&hash_token(&token), email, expires)?;
    Ok(Some(token))
}

/// Start a password reset. The link is written to the log; mail delivery is
/// left to the deployment.
pub fn request_reset(store: &dyn Store, config: &SiteConfig, email: &str) -> Result<()> {
    if let Some(token) = create_token(store, email)? {
        let link = reset_link(config, &token);
        info!("Password reset requested for {}", email.trim());
        debug!("Password reset link: {}", link);
    }
    Ok(())
}

pub fn reset_link(config: &SiteConfig, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        config.site.url.trim_end_matches('/'),
        token
    )
}

/// Set a new password with a reset token. The token is spent and every open
/// session of the operator is closed.
pub fn confirm_reset(store: &dyn Store, token: &str, password: &str) -> Result<()> {
    if store.is_demo() {
        return Err(Error::NotConnected);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let email = store
        .reset_token_consume(&hash_token(token.trim()))?
        .ok_or(Error::InvalidToken)?;
    let user = store.user_get_by_email(&email)?.ok_or(Error::InvalidToken)?;

    let hash = super::auth::hash_password(password)?;
    store.user_update_password(user.id, &hash)?;
    store.session_delete_for_user(user.id)?;
    info!("Password reset completed for {}", user.email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_stable_hex() {
        let h = hash_token("abc");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_token("abc"));
        assert_ne!(h, hash_token("abd"));
    }

    #[test]
    fn reset_link_joins_site_url() {
        let mut config = SiteConfig::default();
        config.site.url = "https://example.com/".to_string();
        assert_eq!(reset_link(&config, "t1"), "https://example.com/reset-password?token=t1");
    }
}
