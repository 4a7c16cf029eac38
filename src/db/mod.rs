mod from_row;
mod schema;
pub mod queries;

pub use schema::{init_audit_db, init_db};

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::DatabaseName;

pub type DbPool = Pool<SqliteConnectionManager>;

/// How long a connection waits on the SQLite write lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });
    Pool::builder().max_size(10).build(manager)
}

/// Copy the live database to `dest` using SQLite's online backup API.
pub fn backup_to(pool: &DbPool, dest: &Path) -> crate::error::Result<()> {
    let conn = pool.get()?;
    conn.backup(DatabaseName::Main, dest, None)?;
    Ok(())
}

/// Replace the database contents with the backup at `src`.
pub fn restore_from(pool: &DbPool, src: &Path) -> crate::error::Result<()> {
    let mut conn = pool.get()?;
    conn.restore(
        DatabaseName::Main,
        src,
        None::<fn(rusqlite::backup::Progress)>,
    )?;
    Ok(())
}
