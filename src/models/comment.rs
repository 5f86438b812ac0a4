use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
    pub approved: bool,
    pub created_at: NaiveDateTime,
    /// Joined from the parent post in operator listings.
    pub post_title: Option<String>,
    pub post_slug: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommentForm {
    pub author_name: String,
    pub author_email: String,
    pub content: String,
}

impl CommentForm {
    /// Trims every field and rejects blanks or a malformed email.
    pub fn normalized(&self) -> Result<CommentForm, Error> {
        let form = CommentForm {
            author_name: self.author_name.trim().to_string(),
            author_email: self.author_email.trim().to_string(),
            content: self.content.trim().to_string(),
        };
        super::require("Name", &form.author_name)?;
        super::require("Email", &form.author_email)?;
        super::require("Comment", &form.content)?;
        super::require_email(&form.author_email)?;
        Ok(form)
    }
}

/// Operator view of the moderation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentFilter {
    #[default]
    All,
    Pending,
    Approved,
}

impl CommentFilter {
    /// The `approved` value rows must have, or `None` for no constraint.
    pub fn approved(&self) -> Option<bool> {
        match self {
            CommentFilter::All => None,
            CommentFilter::Pending => Some(false),
            CommentFilter::Approved => Some(true),
        }
    }
}

impl FromStr for CommentFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CommentFilter::All),
            "pending" => Ok(CommentFilter::Pending),
            "approved" => Ok(CommentFilter::Approved),
            other => Err(Error::Validation(format!("Unknown comment filter: {}", other))),
        }
    }
}
