use log::{error, info};

use crate::error::{Error, Result};
use crate::models::post::{
    read_time, slugify, NewPost, Post, PostChanges, PostForm, PostPage, PostQuery, PostStatus,
    StatusFilter,
};
use crate::store::Store;

/// One page of posts matching the query, newest first.
pub fn list_posts(store: &dyn Store, query: &PostQuery) -> Result<PostPage> {
    let page = query.page();
    let page_size = query.page_size();

    let posts = store
        .post_list(&query.filter, page_size, query.offset())
        .inspect_err(|e| error!("Error fetching posts: {}", e))?;
    let total = store
        .post_count(&query.filter)
        .inspect_err(|e| error!("Error counting posts: {}", e))?;

    Ok(PostPage {
        posts,
        total,
        page,
        page_size,
        total_pages: (total + page_size - 1) / page_size,
    })
}

pub fn get_post_by_slug(store: &dyn Store, slug: &str) -> Result<Option<Post>> {
    store.post_find_by_slug(slug)
}

pub fn get_post(store: &dyn Store, id: i64) -> Result<Option<Post>> {
    store.post_find_by_id(id)
}

/// Insert a post, deriving the slug from the title when none is given.
pub fn create_post(store: &dyn Store, form: &PostForm, author_id: Option<i64>) -> Result<i64> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(Error::Validation("Title is required".to_string()));
    }

    let slug = match form.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(title),
    };
    if slug.is_empty() {
        return Err(Error::Validation(
            "Slug is empty; use a title with letters or digits".to_string(),
        ));
    }

    let post = NewPost {
        title: title.to_string(),
        slug,
        description: form.description.clone(),
        content: form.content.clone(),
        feature_image: form.feature_image.clone(),
        author_id,
        status: form.status.unwrap_or(PostStatus::Draft),
        tags: form.tags.clone(),
        is_premium: form.is_premium,
        read_time: read_time(&form.content),
        scheduled_at: form.scheduled_at,
        seo_title: form.seo_title.clone(),
        seo_description: form.seo_description.clone(),
    };

    let id = store
        .post_create(&post)
        .inspect_err(|e| error!("Error creating post '{}': {}", post.slug, e))?;
    info!("Post created: {} ({})", post.slug, post.status);
    Ok(id)
}

/// Apply a partial update. Read time follows the content only when the
/// content itself changes. Returns false when the post does not exist.
pub fn update_post(store: &dyn Store, id: i64, changes: &PostChanges) -> Result<bool> {
    let mut changes = changes.clone();
    if let Some(ref slug) = changes.slug {
        let normalized = slugify(slug);
        if normalized.is_empty() {
            return Err(Error::Validation("Slug cannot be empty".to_string()));
        }
        changes.slug = Some(normalized);
    }
    changes.read_time = changes.content.as_deref().map(read_time);

    store
        .post_update(id, &changes)
        .inspect_err(|e| error!("Error updating post {}: {}", id, e))
}

/// Delete a post along with its comments and views.
pub fn delete_post(store: &dyn Store, id: i64) -> Result<()> {
    store
        .post_delete(id)
        .inspect_err(|e| error!("Error deleting post {}: {}", id, e))?;
    info!("Post deleted: {}", id);
    Ok(())
}

/// Published posts go back to draft; anything else becomes published.
/// Returns the new status, or `None` when the post does not exist.
pub fn toggle_publish(store: &dyn Store, id: i64) -> Result<Option<PostStatus>> {
    let Some(post) = store.post_find_by_id(id)? else {
        return Ok(None);
    };
    let status = match post.status {
        PostStatus::Published => PostStatus::Draft,
        _ => PostStatus::Published,
    };
    let changes = PostChanges { status: Some(status), ..Default::default() };
    Ok(update_post(store, id, &changes)?.then_some(status))
}

/// Append a view row. Only the host of the referrer is kept.
pub fn record_view(store: &dyn Store, post_id: i64, referrer: Option<&str>) -> Result<()> {
    let host = referrer.and_then(referrer_host);
    store
        .post_view_record(post_id, host.as_deref())
        .inspect_err(|e| error!("Error recording view for post {}: {}", post_id, e))
}

/// Unique tags across published posts, in first-seen order.
pub fn list_all_tags(store: &dyn Store) -> Result<Vec<String>> {
    let lists = store
        .post_tag_lists(StatusFilter::default())
        .inspect_err(|e| error!("Error fetching tags: {}", e))?;
    Ok(unique_tags(lists))
}

fn unique_tags(lists: Vec<Vec<String>>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    lists
        .into_iter()
        .flatten()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Extract the host from a referrer URL, without a leading "www.".
fn referrer_host(referrer: &str) -> Option<String> {
    let parsed = url::Url::parse(referrer.trim()).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(lists: &[&[&str]]) -> Vec<Vec<String>> {
        lists
            .iter()
            .map(|l| l.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn unique_tags_keeps_first_seen_order() {
        let lists = tags(&[&["React", "Next.js"], &["Mobile", "React"], &[], &["SEO", "Next.js"]]);
        assert_eq!(unique_tags(lists), vec!["React", "Next.js", "Mobile", "SEO"]);
    }

    #[test]
    fn unique_tags_is_case_sensitive() {
        let lists = tags(&[&["react"], &["React"]]);
        assert_eq!(unique_tags(lists).len(), 2);
    }

    #[test]
    fn referrer_host_strips_path_and_www() {
        assert_eq!(
            referrer_host("https://www.Google.com/search?q=rust").as_deref(),
            Some("google.com")
        );
        assert_eq!(referrer_host("http://news.ycombinator.com/").as_deref(), Some("news.ycombinator.com"));
        assert_eq!(referrer_host("not a url"), None);
        assert_eq!(referrer_host(""), None);
    }
}
