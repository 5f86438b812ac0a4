use chrono::{NaiveDateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::DbPool;
use crate::error::{is_unique_violation, Error, Result};
use crate::models::analytics::ViewedPost;
use crate::models::comment::{Comment, CommentForm};
use crate::models::contact::{ContactForm, ContactMessage};
use crate::models::newsletter::Subscriber;
use crate::models::portfolio::{Project, ProjectChanges, ProjectFilter, ProjectForm};
use crate::models::post::{NewPost, Post, PostChanges, PostFilter, PostStatus, StatusFilter};
use crate::models::user::User;

use super::Store;

/// SQLite-backed implementation of the Store trait.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self> {
        let pool = crate::db::init_pool_at(path)?;
        Ok(Self { pool })
    }

    fn count(&self, sql: &str, values: &[&dyn ToSql]) -> Result<i64> {
        let conn = self.pool.get()?;
        Ok(conn.query_row(sql, values, |row| row.get(0))?)
    }

    fn times_since(&self, sql: &str, since: NaiveDateTime) -> Result<Vec<NaiveDateTime>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![since], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<NaiveDateTime>>>()?)
    }
}

// ── Column conversions ──────────────────────────────────────────────

impl ToSql for PostStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PostStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
    }
}

fn json_list(row: &Row, column: &str) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

const POST_SELECT: &str = "SELECT p.*, u.full_name AS author_name
     FROM posts p LEFT JOIN users u ON u.id = p.author_id";

const COMMENT_SELECT: &str = "SELECT c.*, p.title AS post_title, p.slug AS post_slug
     FROM comments c LEFT JOIN posts p ON p.id = c.post_id";

/// Message for a slug that another post already uses.
const SLUG_TAKEN: &str = "A post with this slug already exists";

const USER_COLS: &str = "id, email, password_hash, full_name, avatar_url, role, bio, created_at";

fn post_from_row(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get("id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        content: row.get("content")?,
        feature_image: row.get("feature_image")?,
        author_id: row.get("author_id")?,
        author_name: row.get("author_name")?,
        status: row.get("status")?,
        tags: json_list(row, "tags")?,
        is_premium: row.get("is_premium")?,
        read_time: row.get("read_time")?,
        scheduled_at: row.get("scheduled_at")?,
        seo_title: row.get("seo_title")?,
        seo_description: row.get("seo_description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        post_id: row.get("post_id")?,
        author_name: row.get("author_name")?,
        author_email: row.get("author_email")?,
        content: row.get("content")?,
        approved: row.get("approved")?,
        created_at: row.get("created_at")?,
        post_title: row.get("post_title")?,
        post_slug: row.get("post_slug")?,
    })
}

fn subscriber_from_row(row: &Row) -> rusqlite::Result<Subscriber> {
    Ok(Subscriber {
        id: row.get("id")?,
        email: row.get("email")?,
        confirmed: row.get("confirmed")?,
        created_at: row.get("created_at")?,
    })
}

fn message_from_row(row: &Row) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        subject: row.get("subject")?,
        message: row.get("message")?,
        read: row.get("read")?,
        created_at: row.get("created_at")?,
    })
}

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        image_url: row.get("image_url")?,
        tech_stack: json_list(row, "tech_stack")?,
        category: row.get("category")?,
        live_url: row.get("live_url")?,
        github_url: row.get("github_url")?,
        case_study: row.get("case_study")?,
        featured: row.get("featured")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
    })
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        avatar_url: row.get(4)?,
        role: row.get(5)?,
        bio: row.get(6)?,
        created_at: row.get(7)?,
    })
}

// ── Dynamic SQL helpers ─────────────────────────────────────────────

/// Escape LIKE wildcards so user search text matches literally.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// WHERE clause (possibly empty) and its positional values for a post filter.
fn post_where(filter: &PostFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let StatusFilter::Only(status) = filter.status {
        clauses.push("p.status = ?");
        values.push(Box::new(status));
    }
    if let Some(ref q) = filter.search {
        clauses.push(
            "(LOWER(p.title) LIKE ? ESCAPE '\\' OR LOWER(COALESCE(p.description, '')) LIKE ? ESCAPE '\\')",
        );
        let pattern = like_pattern(q);
        values.push(Box::new(pattern.clone()));
        values.push(Box::new(pattern));
    }
    if let Some(ref tag) = filter.tag {
        clauses.push("EXISTS (SELECT 1 FROM json_each(p.tags) WHERE json_each.value = ?)");
        values.push(Box::new(tag.clone()));
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

/// Column assignments for a partial UPDATE; only present fields are set.
struct Assignments {
    columns: Vec<&'static str>,
    values: Vec<Box<dyn ToSql>>,
}

impl Assignments {
    fn new() -> Self {
        Assignments { columns: Vec::new(), values: Vec::new() }
    }

    fn set<T: ToSql + Clone + 'static>(&mut self, column: &'static str, value: &Option<T>) {
        if let Some(v) = value {
            self.columns.push(column);
            self.values.push(Box::new(v.clone()));
        }
    }

    fn set_json(&mut self, column: &'static str, value: &Option<Vec<String>>) -> Result<()> {
        if let Some(v) = value {
            self.columns.push(column);
            self.values.push(Box::new(serde_json::to_string(v)?));
        }
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Run the UPDATE. Returns false when no row has `id`. A UNIQUE violation
    /// becomes `Error::Conflict(conflict)`.
    fn execute(
        self,
        pool: &DbPool,
        table: &str,
        touch: bool,
        id: i64,
        conflict: &str,
    ) -> Result<bool> {
        let conn = pool.get()?;
        if self.is_empty() && !touch {
            let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?1", table);
            let found: i64 = conn.query_row(&sql, params![id], |row| row.get(0))?;
            return Ok(found > 0);
        }
        let mut sets: Vec<String> = self.columns.iter().map(|c| format!("{} = ?", c)).collect();
        if touch {
            sets.push("updated_at = CURRENT_TIMESTAMP".to_string());
        }
        let sql = format!("UPDATE {} SET {} WHERE id = ?", table, sets.join(", "));

        let mut values = self.values;
        values.push(Box::new(id));
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

        match conn.execute(&sql, refs.as_slice()) {
            Ok(changed) => Ok(changed > 0),
            Err(e) if is_unique_violation(&e) => Err(Error::Conflict(conflict.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<()> {
        crate::db::run_migrations(&self.pool)
    }

    fn db_backend(&self) -> &str {
        "sqlite"
    }

    // ── Posts ───────────────────────────────────────────────────────

    fn post_find_by_id(&self, id: i64) -> Result<Option<Post>> {
        let conn = self.pool.get()?;
        let sql = format!("{} WHERE p.id = ?1", POST_SELECT);
        Ok(conn.query_row(&sql, params![id], post_from_row).optional()?)
    }

    fn post_find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let conn = self.pool.get()?;
        let sql = format!("{} WHERE p.slug = ?1", POST_SELECT);
        Ok(conn.query_row(&sql, params![slug], post_from_row).optional()?)
    }

    fn post_list(&self, filter: &PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let conn = self.pool.get()?;
        let (clause, mut values) = post_where(filter);
        let sql = format!(
            "{}{} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?",
            POST_SELECT, clause
        );
        values.push(Box::new(limit));
        values.push(Box::new(offset));
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(refs.as_slice(), post_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<Post>>>()?)
    }

    fn post_count(&self, filter: &PostFilter) -> Result<i64> {
        let (clause, values) = post_where(filter);
        let sql = format!("SELECT COUNT(*) FROM posts p{}", clause);
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        self.count(&sql, refs.as_slice())
    }

    fn post_tag_lists(&self, status: StatusFilter) -> Result<Vec<Vec<String>>> {
        let filter = PostFilter { status, ..Default::default() };
        let (clause, values) = post_where(&filter);
        let sql = format!(
            "SELECT p.tags FROM posts p{} ORDER BY p.created_at DESC, p.id DESC",
            clause
        );
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(refs.as_slice(), |row| json_list(row, "tags"))?;
        Ok(rows.collect::<rusqlite::Result<Vec<Vec<String>>>>()?)
    }

    fn post_create(&self, post: &NewPost) -> Result<i64> {
        let conn = self.pool.get()?;
        let tags = serde_json::to_string(&post.tags)?;
        let inserted = conn.execute(
            "INSERT INTO posts (title, slug, description, content, feature_image, author_id, status,
                                tags, is_premium, read_time, scheduled_at, seo_title, seo_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                post.title,
                post.slug,
                post.description,
                post.content,
                post.feature_image,
                post.author_id,
                post.status,
                tags,
                post.is_premium,
                post.read_time,
                post.scheduled_at,
                post.seo_title,
                post.seo_description,
            ],
        );
        match inserted {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(Error::Conflict(SLUG_TAKEN.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn post_update(&self, id: i64, changes: &PostChanges) -> Result<bool> {
        let mut a = Assignments::new();
        a.set("title", &changes.title);
        a.set("slug", &changes.slug);
        a.set("description", &changes.description);
        a.set("content", &changes.content);
        a.set("feature_image", &changes.feature_image);
        a.set("status", &changes.status);
        a.set_json("tags", &changes.tags)?;
        a.set("is_premium", &changes.is_premium);
        a.set("read_time", &changes.read_time);
        a.set("scheduled_at", &changes.scheduled_at);
        a.set("seo_title", &changes.seo_title);
        a.set("seo_description", &changes.seo_description);
        a.execute(&self.pool, "posts", true, id, SLUG_TAKEN)
    }

    fn post_delete(&self, id: i64) -> Result<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM post_views WHERE post_id = ?1", params![id])?;
        tx.execute("DELETE FROM comments WHERE post_id = ?1", params![id])?;
        tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }

    // ── Post views ──────────────────────────────────────────────────

    fn post_view_record(&self, post_id: i64, referrer: Option<&str>) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO post_views (post_id, referrer) VALUES (?1, ?2)",
            params![post_id, referrer],
        )?;
        Ok(())
    }

    fn post_view_count(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM post_views", &[])
    }

    fn post_view_count_for(&self, post_id: i64) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM post_views WHERE post_id = ?1", params![post_id])
    }

    fn post_view_times_since(&self, since: NaiveDateTime) -> Result<Vec<NaiveDateTime>> {
        self.times_since(
            "SELECT viewed_at FROM post_views WHERE viewed_at >= ?1 ORDER BY viewed_at ASC",
            since,
        )
    }

    fn post_view_sample(&self, limit: i64) -> Result<Vec<ViewedPost>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.title, p.slug
             FROM (SELECT post_id FROM post_views ORDER BY viewed_at DESC, id DESC LIMIT ?1) v
             JOIN posts p ON p.id = v.post_id",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(ViewedPost {
                id: row.get(0)?,
                title: row.get(1)?,
                slug: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<ViewedPost>>>()?)
    }

    // ── Comments ────────────────────────────────────────────────────

    fn comment_find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let conn = self.pool.get()?;
        let sql = format!("{} WHERE c.id = ?1", COMMENT_SELECT);
        Ok(conn.query_row(&sql, params![id], comment_from_row).optional()?)
    }

    fn comment_list(&self, post_id: Option<i64>, approved: Option<bool>) -> Result<Vec<Comment>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(pid) = post_id {
            clauses.push("c.post_id = ?");
            values.push(Box::new(pid));
        }
        if let Some(a) = approved {
            clauses.push("c.approved = ?");
            values.push(Box::new(a));
        }
        let clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "{}{} ORDER BY c.created_at DESC, c.id DESC",
            COMMENT_SELECT, clause
        );
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(refs.as_slice(), comment_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<Comment>>>()?)
    }

    fn comment_create(&self, post_id: i64, form: &CommentForm) -> Result<i64> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO comments (post_id, author_name, author_email, content, approved)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![post_id, form.author_name, form.author_email, form.content],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn comment_set_approved(&self, id: i64, approved: bool) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE comments SET approved = ?1 WHERE id = ?2",
            params![approved, id],
        )?;
        Ok(())
    }

    fn comment_delete(&self, id: i64) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Newsletter ──────────────────────────────────────────────────

    fn subscriber_create(&self, email: &str) -> Result<i64> {
        let conn = self.pool.get()?;
        match conn.execute(
            "INSERT INTO newsletter_subscribers (email) VALUES (?1)",
            params![email],
        ) {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(Error::AlreadySubscribed),
            Err(e) => Err(e.into()),
        }
    }

    fn subscriber_list(&self) -> Result<Vec<Subscriber>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM newsletter_subscribers ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], subscriber_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<Subscriber>>>()?)
    }

    fn subscriber_count(&self, confirmed_only: bool) -> Result<i64> {
        if confirmed_only {
            self.count("SELECT COUNT(*) FROM newsletter_subscribers WHERE confirmed = 1", &[])
        } else {
            self.count("SELECT COUNT(*) FROM newsletter_subscribers", &[])
        }
    }

    fn subscriber_times_since(&self, since: NaiveDateTime) -> Result<Vec<NaiveDateTime>> {
        self.times_since(
            "SELECT created_at FROM newsletter_subscribers WHERE created_at >= ?1 ORDER BY created_at ASC",
            since,
        )
    }

    // ── Contact messages ────────────────────────────────────────────

    fn contact_create(&self, form: &ContactForm) -> Result<i64> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO contact_messages (name, email, subject, message) VALUES (?1, ?2, ?3, ?4)",
            params![form.name, form.email, form.subject, form.message],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn contact_list(&self) -> Result<Vec<ContactMessage>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT * FROM contact_messages ORDER BY created_at DESC, id DESC")?;
        let rows = stmt.query_map([], message_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<ContactMessage>>>()?)
    }

    fn contact_mark_read(&self, id: i64) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute("UPDATE contact_messages SET read = 1 WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn contact_count(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM contact_messages", &[])
    }

    // ── Portfolio ───────────────────────────────────────────────────

    fn project_find_by_id(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                "SELECT * FROM portfolio_projects WHERE id = ?1",
                params![id],
                project_from_row,
            )
            .optional()?)
    }

    fn project_list(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(ref c) = filter.category {
            clauses.push("category = ?");
            values.push(Box::new(c.clone()));
        }
        if filter.featured_only {
            clauses.push("featured = 1");
        }
        let mut sql = String::from("SELECT * FROM portfolio_projects");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY sort_order ASC, id ASC");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            values.push(Box::new(limit));
        }
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(refs.as_slice(), project_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<Project>>>()?)
    }

    fn project_create(&self, form: &ProjectForm) -> Result<i64> {
        let conn = self.pool.get()?;
        let tech_stack = serde_json::to_string(&form.tech_stack)?;
        conn.execute(
            "INSERT INTO portfolio_projects (title, description, image_url, tech_stack, category,
                                             live_url, github_url, case_study, featured, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                form.title,
                form.description,
                form.image_url,
                tech_stack,
                form.category,
                form.live_url,
                form.github_url,
                form.case_study,
                form.featured,
                form.sort_order,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn project_update(&self, id: i64, changes: &ProjectChanges) -> Result<bool> {
        let mut a = Assignments::new();
        a.set("title", &changes.title);
        a.set("description", &changes.description);
        a.set("image_url", &changes.image_url);
        a.set_json("tech_stack", &changes.tech_stack)?;
        a.set("category", &changes.category);
        a.set("live_url", &changes.live_url);
        a.set("github_url", &changes.github_url);
        a.set("case_study", &changes.case_study);
        a.set("featured", &changes.featured);
        a.set("sort_order", &changes.sort_order);
        a.execute(&self.pool, "portfolio_projects", false, id, "Project already exists")
    }

    fn project_delete(&self, id: i64) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM portfolio_projects WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Users ───────────────────────────────────────────────────────

    fn user_get_by_id(&self, id: i64) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
                params![id],
                user_from_row,
            )
            .optional()?)
    }

    fn user_get_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1 COLLATE NOCASE", USER_COLS),
                params![email],
                user_from_row,
            )
            .optional()?)
    }

    fn user_count(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM users", &[])
    }

    fn user_create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
        role: &str,
    ) -> Result<i64> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (email, password_hash, full_name, role) VALUES (?1, ?2, ?3, ?4)",
            params![email, password_hash, full_name, role],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn user_update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id],
        )?;
        Ok(())
    }

    // ── Sessions ────────────────────────────────────────────────────

    fn session_create(&self, user_id: i64, token: &str, expires_at: NaiveDateTime) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, expires_at],
        )?;
        Ok(())
    }

    fn session_get_user_id(&self, token: &str) -> Result<Option<i64>> {
        let conn = self.pool.get()?;
        let now = Utc::now().naive_utc();
        Ok(conn
            .query_row(
                "SELECT user_id FROM sessions WHERE token = ?1 AND expires_at > ?2",
                params![token, now],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn session_delete(&self, token: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    fn session_delete_for_user(&self, user_id: i64) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?;
        Ok(())
    }

    fn session_cleanup_expired(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        let now = Utc::now().naive_utc();
        Ok(conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?)
    }

    // ── Password resets ─────────────────────────────────────────────

    fn reset_token_create(
        &self,
        token_hash: &str,
        email: &str,
        expires_at: NaiveDateTime,
    ) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO password_resets (token_hash, email, expires_at) VALUES (?1, ?2, ?3)",
            params![token_hash, email, expires_at],
        )?;
        Ok(())
    }

    fn reset_token_consume(&self, token_hash: &str) -> Result<Option<String>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let now = Utc::now().naive_utc();
        let email: Option<String> = tx
            .query_row(
                "SELECT email FROM password_resets
                 WHERE token_hash = ?1 AND used = 0 AND expires_at > ?2",
                params![token_hash, now],
                |row| row.get(0),
            )
            .optional()?;
        if email.is_some() {
            tx.execute(
                "UPDATE password_resets SET used = 1 WHERE token_hash = ?1",
                params![token_hash],
            )?;
        }
        tx.commit()?;
        Ok(email)
    }
}
