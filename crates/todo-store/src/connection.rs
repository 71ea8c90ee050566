//! `SQLite` connection pool with WAL mode and foreign keys enabled.
//!
//! The [`PragmaCustomizer`] runs on each new connection so that cascading
//! deletes from `tasks` to `comments` are always enforced.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 8).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 5000).
    pub busy_timeout_ms: u32,
    /// Cache size in KiB (default: 8192 = 8 MB).
    pub cache_size_kib: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5_000,
            cache_size_kib: 8192,
        }
    }
}

/// Pragmas applied to every connection the pool opens.
#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
    cache_size_kib: i64,
}

impl PragmaCustomizer {
    fn batch(&self) -> String {
        format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {busy};\
             PRAGMA foreign_keys = ON;\
             PRAGMA cache_size = -{cache};\
             PRAGMA synchronous = NORMAL;",
            busy = self.busy_timeout_ms,
            cache = self.cache_size_kib,
        )
    }
}

impl From<&ConnectionConfig> for PragmaCustomizer {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            busy_timeout_ms: config.busy_timeout_ms,
            cache_size_kib: config.cache_size_kib,
        }
    }
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&self.batch())
    }
}

fn builder(config: &ConnectionConfig) -> r2d2::Builder<SqliteConnectionManager> {
    Pool::builder()
        .connection_timeout(CONNECTION_TIMEOUT)
        .connection_customizer(Box::new(PragmaCustomizer::from(config)))
}

/// Pool over a private in-memory database.
///
/// Each in-memory connection is its own database, so the pool is capped at
/// one connection that is never reaped, whatever `pool_size` says.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool> {
    Ok(builder(config)
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .build(SqliteConnectionManager::memory())?)
}

/// Pool over the database file at `path`, created if missing.
pub fn new_file(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool> {
    Ok(builder(config)
        .max_size(config.pool_size)
        .build(SqliteConnectionManager::file(path))?)
}

/// Pragmas as a connection actually sees them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PragmaState {
    /// `wal` for files, `memory` for in-memory databases.
    pub journal_mode: String,
    /// Whether `ON DELETE CASCADE` from tasks to comments is enforced.
    pub foreign_keys_enabled: bool,
    /// Lock wait in milliseconds.
    pub busy_timeout_ms: u32,
}

/// Read back the pragmas the store depends on.
pub fn verify_pragmas(conn: &Connection) -> Result<PragmaState> {
    let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    let busy_timeout: u32 = conn.query_row("PRAGMA busy_timeout", [], |row| row.get(0))?;
    Ok(PragmaState {
        journal_mode,
        foreign_keys_enabled: foreign_keys == 1,
        busy_timeout_ms: busy_timeout,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
