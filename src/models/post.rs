use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Words per minute used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

pub const DEFAULT_PAGE_SIZE: i64 = 9;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Scheduled,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "scheduled" => Ok(PostStatus::Scheduled),
            other => Err(Error::Validation(format!("Unknown post status: {}", other))),
        }
    }
}

/// Which statuses a listing includes. Listings default to published posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Only(PostStatus),
    All,
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Only(PostStatus::Published)
    }
}

impl StatusFilter {
    pub fn matches(&self, status: PostStatus) -> bool {
        match self {
            StatusFilter::Only(s) => *s == status,
            StatusFilter::All => true,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: String,
    pub feature_image: Option<String>,
    pub author_id: Option<i64>,
    pub author_name: Option<String>,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub is_premium: bool,
    pub read_time: i64,
    pub scheduled_at: Option<NaiveDateTime>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Editor payload for a new post. Slug and read time are derived when absent.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PostForm {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub content: String,
    pub feature_image: Option<String>,
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_premium: bool,
    pub scheduled_at: Option<NaiveDateTime>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}

/// Fully derived row handed to the store on insert.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: String,
    pub feature_image: Option<String>,
    pub author_id: Option<i64>,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub is_premium: bool,
    pub read_time: i64,
    pub scheduled_at: Option<NaiveDateTime>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}

/// Partial update: every field that is present overwrites the stored value.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub feature_image: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    #[serde(skip_deserializing)]
    pub read_time: Option<i64>,
}

/// Row filter shared by the list and count queries.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub status: StatusFilter,
}

impl PostFilter {
    /// In-memory evaluation of the filter, mirroring the SQL predicate.
    pub fn matches(&self, post: &Post) -> bool {
        if !self.status.matches(post.status) {
            return false;
        }
        if let Some(ref q) = self.search {
            let q = q.to_lowercase();
            let in_title = post.title.to_lowercase().contains(&q);
            let in_desc = post
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&q))
                .unwrap_or(false);
            if !in_title && !in_desc {
                return false;
            }
        }
        if let Some(ref tag) = self.tag {
            if !post.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        true
    }
}

/// Listing request as it arrives from a caller. Newest posts come first.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub page: i64,
    pub page_size: i64,
}

impl Default for PostQuery {
    fn default() -> Self {
        PostQuery {
            filter: PostFilter::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PostQuery {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows to skip. Saturates for absurd page numbers, which then land past
    /// the last row and yield an empty page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Lower-case ASCII slug: alphanumeric runs joined by single hyphens.
pub fn slugify(title: &str) -> String {
    slug::slugify(title)
}

/// Minutes to read `content`, never less than one.
pub fn read_time(content: &str) -> i64 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i64
}
