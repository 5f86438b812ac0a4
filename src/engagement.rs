use log::{error, info};

use crate::error::{Error, Result};
use crate::models::comment::{Comment, CommentFilter, CommentForm};
use crate::models::contact::{ContactForm, ContactMessage};
use crate::models::newsletter::{Subscriber, SubscriberCount};
use crate::store::Store;

const CSV_HEADER: &str = "email,confirmed,created_at";

// ── Comments ────────────────────────────────────────────────────────

/// Store a visitor comment. It stays hidden until an operator approves it.
pub fn submit_comment(store: &dyn Store, post_id: i64, form: &CommentForm) -> Result<i64> {
    let form = form.normalized()?;
    let id = store
        .comment_create(post_id, &form)
        .inspect_err(|e| error!("Error submitting comment on post {}: {}", post_id, e))?;
    info!("Comment received on post {} (pending)", post_id);
    Ok(id)
}

pub fn list_approved_comments(store: &dyn Store, post_id: i64) -> Result<Vec<Comment>> {
    store
        .comment_list(Some(post_id), Some(true))
        .inspect_err(|e| error!("Error fetching comments: {}", e))
}

pub fn list_all_comments(store: &dyn Store, filter: CommentFilter) -> Result<Vec<Comment>> {
    store
        .comment_list(None, filter.approved())
        .inspect_err(|e| error!("Error fetching comments: {}", e))
}

pub fn approve_comment(store: &dyn Store, id: i64) -> Result<()> {
    store
        .comment_set_approved(id, true)
        .inspect_err(|e| error!("Error approving comment {}: {}", id, e))
}

pub fn delete_comment(store: &dyn Store, id: i64) -> Result<()> {
    store
        .comment_delete(id)
        .inspect_err(|e| error!("Error deleting comment {}: {}", id, e))
}

// ── Newsletter ──────────────────────────────────────────────────────

/// Add an address to the newsletter list. A repeat address is reported as
/// `Error::AlreadySubscribed`.
pub fn subscribe(store: &dyn Store, email: &str) -> Result<i64> {
    let email = email.trim().to_lowercase();
    if !crate::models::looks_like_email(&email) {
        return Err(Error::Validation("Please enter a valid email address".to_string()));
    }
    match store.subscriber_create(&email) {
        Ok(id) => {
            info!("Newsletter subscription added");
            Ok(id)
        }
        Err(Error::AlreadySubscribed) => Err(Error::AlreadySubscribed),
        Err(e) => {
            error!("Error subscribing: {}", e);
            Err(e)
        }
    }
}

pub fn list_subscribers(store: &dyn Store) -> Result<Vec<Subscriber>> {
    store
        .subscriber_list()
        .inspect_err(|e| error!("Error fetching subscribers: {}", e))
}

pub fn count_subscribers(store: &dyn Store) -> Result<SubscriberCount> {
    Ok(SubscriberCount {
        total: store.subscriber_count(false)?,
        confirmed: store.subscriber_count(true)?,
    })
}

/// Subscriber list as CSV: a header line, then one row per subscriber in
/// listing order. Lines are joined by `\n` with no trailing newline.
pub fn export_subscribers_csv(store: &dyn Store) -> Result<String> {
    let subscribers = list_subscribers(store)?;
    Ok(subscribers_csv(&subscribers))
}

fn subscribers_csv(subscribers: &[Subscriber]) -> String {
    let mut lines = Vec::with_capacity(subscribers.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for s in subscribers {
        lines.push(format!(
            "{},{},{}",
            csv_field(&s.email),
            s.confirmed,
            s.created_at.format("%Y-%m-%dT%H:%M:%S")
        ));
    }
    lines.join("\n")
}

/// Quote a field only when it holds a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ── Contact ─────────────────────────────────────────────────────────

pub fn submit_contact_message(store: &dyn Store, form: &ContactForm) -> Result<i64> {
    let form = form.normalized()?;
    let id = store
        .contact_create(&form)
        .inspect_err(|e| error!("Error saving contact message: {}", e))?;
    info!("Contact message received: {}", form.subject);
    Ok(id)
}

pub fn list_contact_messages(store: &dyn Store) -> Result<Vec<ContactMessage>> {
    store
        .contact_list()
        .inspect_err(|e| error!("Error fetching messages: {}", e))
}

pub fn mark_message_read(store: &dyn Store, id: i64) -> Result<()> {
    store
        .contact_mark_read(id)
        .inspect_err(|e| error!("Error marking message {} read: {}", id, e))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn subscriber(email: &str, confirmed: bool) -> Subscriber {
        Subscriber {
            id: 1,
            email: email.to_string(),
            confirmed,
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
        }
    }

    #[test]
    fn csv_single_subscriber() {
        let csv = subscribers_csv(&[subscriber("a@x.com", true)]);
        assert_eq!(csv, "email,confirmed,created_at\na@x.com,true,2024-01-01T00:00:00");
    }

    #[test]
    fn csv_empty_list_is_header_only() {
        assert_eq!(subscribers_csv(&[]), "email,confirmed,created_at");
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        assert_eq!(csv_field("plain@x.com"), "plain@x.com");
        assert_eq!(csv_field("a,b@x.com"), "\"a,b@x.com\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }
}
