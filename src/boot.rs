use std::sync::Arc;

use log::{info, warn};

use crate::config::SiteConfig;
use crate::error::Result;
use crate::security::auth;
use crate::store::demo::DemoStore;
use crate::store::sqlite::SqliteStore;
use crate::store::Store;

/// Pick the data store once at startup. A configured database path opens the
/// SQLite store and applies migrations; no path means demo mode.
pub fn select_store(config: &SiteConfig) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match config.database_path() {
        Some(path) => {
            info!("Opening SQLite database at {}", path);
            Arc::new(SqliteStore::new_at(path)?)
        }
        None => {
            warn!("No database configured: running in demo mode, writes will not be saved");
            Arc::new(DemoStore::new())
        }
    };
    prepare(store.as_ref(), config)?;
    Ok(store)
}

/// Migrate, seed the first operator and drop stale sessions.
pub fn prepare(store: &dyn Store, config: &SiteConfig) -> Result<()> {
    store.run_migrations()?;
    auth::seed_operator(store, config)?;
    let removed = store.session_cleanup_expired()?;
    if removed > 0 {
        info!("Removed {} expired session(s)", removed);
    }
    info!("Store ready (backend: {})", store.db_backend());
    Ok(())
}
