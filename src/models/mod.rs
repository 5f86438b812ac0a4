pub mod analytics;
pub mod comment;
pub mod contact;
pub mod newsletter;
pub mod portfolio;
pub mod post;
pub mod user;

use crate::error::Error;

fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_email(value: &str) -> Result<(), Error> {
    if looks_like_email(value) {
        Ok(())
    } else {
        Err(Error::Validation("Please enter a valid email address".to_string()))
    }
}

/// Loose shape check: one `@`, something before it, a dotted domain after it.
pub fn looks_like_email(value: &str) -> bool {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}
