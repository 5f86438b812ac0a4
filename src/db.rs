use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::Result;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Open (creating if needed) the database file at `path`.
pub fn init_pool_at(path: &str) -> Result<DbPool> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| crate::error::Error::Backend(format!("{}: {}", parent.display(), e)))?;
        }
    }
    let manager = SqliteConnectionManager::file(path)
        .with_init(|c| c.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;"));
    let pool = Pool::builder().max_size(10).build(manager)?;
    Ok(pool)
}

/// Pool over a named shared-cache in-memory database. Every connection of the
/// pool sees the same data; distinct names give isolated databases.
pub fn init_memory_pool(name: &str) -> Result<DbPool> {
    let uri = format!("file:{}?mode=memory&cache=shared", name);
    let manager = SqliteConnectionManager::file(uri)
        .with_init(|c| c.execute_batch("PRAGMA foreign_keys=ON;"));
    let pool = Pool::builder().max_size(4).build(manager)?;
    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Operator profiles
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            full_name TEXT,
            avatar_url TEXT,
            role TEXT NOT NULL DEFAULT 'author',
            bio TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Blog posts; tags is a JSON array of strings
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            description TEXT,
            content TEXT NOT NULL DEFAULT '',
            feature_image TEXT,
            author_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            tags TEXT NOT NULL DEFAULT '[]',
            is_premium INTEGER NOT NULL DEFAULT 0,
            read_time INTEGER NOT NULL DEFAULT 1,
            scheduled_at DATETIME,
            seo_title TEXT,
            seo_description TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status, created_at);

        -- Comments (moderated)
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY,
            post_id INTEGER NOT NULL,
            author_name TEXT NOT NULL,
            author_email TEXT NOT NULL,
            content TEXT NOT NULL,
            approved INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (post_id) REFERENCES posts(id)
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, approved);

        -- Newsletter
        CREATE TABLE IF NOT EXISTS newsletter_subscribers (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            confirmed INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Portfolio; tech_stack is a JSON array of strings
        CREATE TABLE IF NOT EXISTS portfolio_projects (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            image_url TEXT,
            tech_stack TEXT NOT NULL DEFAULT '[]',
            category TEXT NOT NULL,
            live_url TEXT,
            github_url TEXT,
            case_study TEXT,
            featured INTEGER NOT NULL DEFAULT 0,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Contact form inbox
        CREATE TABLE IF NOT EXISTS contact_messages (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            subject TEXT NOT NULL,
            message TEXT NOT NULL,
            read INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Append-only view log
        CREATE TABLE IF NOT EXISTS post_views (
            id INTEGER PRIMARY KEY,
            post_id INTEGER NOT NULL,
            viewed_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            referrer TEXT,
            FOREIGN KEY (post_id) REFERENCES posts(id)
        );

        CREATE INDEX IF NOT EXISTS idx_views_date ON post_views(viewed_at);
        CREATE INDEX IF NOT EXISTS idx_views_post ON post_views(post_id);

        -- Operator sessions
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            expires_at DATETIME NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        -- Password reset tokens (stored hashed, single use)
        CREATE TABLE IF NOT EXISTS password_resets (
            token_hash TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            expires_at DATETIME NOT NULL,
            used INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        ",
    )?;

    Ok(())
}
