use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use log::error;

use crate::error::Result;
use crate::models::analytics::{DailyViews, DashboardStats, RecentPost, TopPost};
use crate::models::post::{PostFilter, StatusFilter};
use crate::store::Store;

/// Number of most recent view rows examined when ranking posts.
pub const TOP_POSTS_SAMPLE: i64 = 1000;

pub const RECENT_POSTS_LIMIT: i64 = 5;

/// Longest window a daily series covers.
pub const MAX_DAYS: i64 = 365;

pub fn dashboard_stats(store: &dyn Store) -> Result<DashboardStats> {
    let all = PostFilter { status: StatusFilter::All, ..Default::default() };
    let stats = DashboardStats {
        total_posts: store.post_count(&all)?,
        total_views: store.post_view_count()?,
        total_subscribers: store.subscriber_count(false)?,
        total_messages: store.contact_count()?,
    };
    Ok(stats)
}

/// Daily view counts for the last `days` days, oldest first, ending today.
/// `days` is clamped to `1..=MAX_DAYS`.
pub fn views_over_time(store: &dyn Store, days: i64) -> Result<Vec<DailyViews>> {
    let days = days.clamp(1, MAX_DAYS);
    let today = Utc::now().date_naive();
    let times = store
        .post_view_times_since(window_start(today, days))
        .inspect_err(|e| error!("Error fetching views: {}", e))?;
    Ok(daily_series(today, days, &times))
}

/// Daily new-subscriber counts, bucketed like `views_over_time`.
pub fn subscriber_growth(store: &dyn Store, days: i64) -> Result<Vec<DailyViews>> {
    let days = days.clamp(1, MAX_DAYS);
    let today = Utc::now().date_naive();
    let times = store
        .subscriber_times_since(window_start(today, days))
        .inspect_err(|e| error!("Error fetching subscriber growth: {}", e))?;
    Ok(daily_series(today, days, &times))
}

/// Most viewed posts among the latest `TOP_POSTS_SAMPLE` views.
pub fn top_posts(store: &dyn Store, limit: i64) -> Result<Vec<TopPost>> {
    let sample = store
        .post_view_sample(TOP_POSTS_SAMPLE)
        .inspect_err(|e| error!("Error fetching top posts: {}", e))?;

    let mut counts: HashMap<i64, TopPost> = HashMap::new();
    for viewed in sample {
        counts
            .entry(viewed.id)
            .or_insert_with(|| TopPost {
                id: viewed.id,
                title: viewed.title,
                slug: viewed.slug,
                views: 0,
            })
            .views += 1;
    }

    let mut ranked: Vec<TopPost> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.views.cmp(&a.views).then(a.id.cmp(&b.id)));
    ranked.truncate(limit.max(0) as usize);
    Ok(ranked)
}

/// Newest posts of any status with their total view counts.
pub fn recent_posts(store: &dyn Store, limit: Option<i64>) -> Result<Vec<RecentPost>> {
    let all = PostFilter { status: StatusFilter::All, ..Default::default() };
    let posts = store
        .post_list(&all, limit.unwrap_or(RECENT_POSTS_LIMIT).max(0), 0)
        .inspect_err(|e| error!("Error fetching recent posts: {}", e))?;

    posts
        .into_iter()
        .map(|p| {
            Ok(RecentPost {
                views: store.post_view_count_for(p.id)?,
                id: p.id,
                title: p.title,
                status: p.status.to_string(),
                created_at: p.created_at,
            })
        })
        .collect()
}

/// Midnight at the start of the first day in a `days`-long window ending `today`.
fn window_start(today: NaiveDate, days: i64) -> NaiveDateTime {
    (today - Duration::days(days.max(1) - 1)).and_time(chrono::NaiveTime::MIN)
}

/// Bucket timestamps by calendar day into exactly `days` entries ending at
/// `end`, ascending, with zero for days without events. Timestamps outside
/// the window are ignored.
pub fn daily_series(end: NaiveDate, days: i64, timestamps: &[NaiveDateTime]) -> Vec<DailyViews> {
    let days = days.max(0);
    let mut counts: HashMap<NaiveDate, i64> = HashMap::new();
    for t in timestamps {
        *counts.entry(t.date()).or_insert(0) += 1;
    }

    (0..days)
        .rev()
        .map(|offset| {
            let date = end - Duration::days(offset);
            DailyViews {
                date: date.format("%Y-%m-%d").to_string(),
                views: counts.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}
