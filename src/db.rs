//! Process-wide database connection pool.

use once_cell::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection, DbErr};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connects to the database and stores the pool. Later calls keep the first pool.
pub async fn init_db(database_url: String) -> Result<(), DbErr> {
    if DB_POOL.get().is_some() {
        log::warn!("Database pool already initialized; ignoring second init.");
        return Ok(());
    }

    let pool = Database::connect(&database_url).await?;
    if DB_POOL.set(pool).is_err() {
        log::warn!("Database pool was initialized concurrently; keeping the first pool.");
    }

    Ok(())
}

/// Returns the pool, if `init_db` has run.
pub fn get_db_pool() -> Option<&'static DatabaseConnection> {
    DB_POOL.get()
}
