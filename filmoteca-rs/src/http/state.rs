use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::accounts::AccountStore;
use crate::catalogue::CatalogueStore;
use crate::config::RateLimitConfig;
use crate::ids::IdSource;
use crate::views::Views;

#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub catalogue: CatalogueStore,
    pub accounts: AccountStore,
    pub views: Arc<Views>,
    pub static_dir: Option<PathBuf>,
    pub rate_limit: RateLimitConfig,
}

impl AppState {
    /// Wire both stores to the same pool and identifier source.
    pub fn new(
        pool: SqlitePool,
        ids: Arc<dyn IdSource>,
        views: Views,
        image_prefix: &str,
    ) -> Self {
        Self {
            catalogue: CatalogueStore::new(pool.clone(), Arc::clone(&ids), image_prefix),
            accounts: AccountStore::new(pool.clone(), ids),
            pool,
            views: Arc::new(views),
            static_dir: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}
