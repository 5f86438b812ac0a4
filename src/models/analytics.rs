use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PostView {
    pub id: i64,
    pub post_id: i64,
    pub viewed_at: NaiveDateTime,
    pub referrer: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_posts: i64,
    pub total_views: i64,
    pub total_subscribers: i64,
    pub total_messages: i64,
}

/// One day of a time series. Subscriber growth reuses the same shape.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DailyViews {
    pub date: String,
    pub views: i64,
}

/// A post referenced by a sampled view row.
#[derive(Debug, Clone)]
pub struct ViewedPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TopPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub views: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct RecentPost {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub views: i64,
}
