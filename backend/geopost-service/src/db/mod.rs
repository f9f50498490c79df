/// Database access layer
///
/// Repositories are plain async functions over any SQLite executor;
/// [`PostStore`] adapts them to the `geo-query` storage traits.
pub mod post_repo;
pub mod scan_repo;

pub use post_repo::PostStore;

use crate::SERVICE_NAME;
use db_pool::{create_pool, DbConfig as DbPoolConfig};
use sqlx::migrate::Migrator;
use sqlx::SqlitePool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open the pool for `database_url` and bring the schema up to date.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let mut cfg = DbPoolConfig::from_env(SERVICE_NAME);
    cfg.database_url = database_url.to_string();
    cfg.log_config();

    let pool = create_pool(cfg).await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}
