pub mod documents;
pub mod gateway;
pub mod models;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::db::documents::SqliteDocumentRepository;
use crate::db::gateway::Gateway;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_documents",
    include_str!("../../migrations/001_documents.sql"),
)];

/// Where the document store lives, parsed from a `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation<'a> {
    Memory,
    File(&'a Path),
}

impl<'a> DatabaseLocation<'a> {
    /// Accepts `sqlite://<path>`, `sqlite::memory:`, `:memory:` or a bare path.
    pub fn parse(url: &'a str) -> Self {
        let url = url.trim();
        if url == ":memory:" || url == "sqlite::memory:" || url == "sqlite://:memory:" {
            return DatabaseLocation::Memory;
        }
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        DatabaseLocation::File(Path::new(path))
    }
}

/// Open the configured document store, or fall back to a disconnected gateway.
pub fn connect(config: &DatabaseConfig) -> Gateway {
    let Some((url, name)) = config.connection() else {
        tracing::warn!("DATABASE_URL or DATABASE_NAME not set, running without a database");
        return Gateway::disconnected();
    };

    let opened = open_pool(url).and_then(|pool| {
        run_migrations(&pool)?;
        Ok(pool)
    });

    match opened {
        Ok(pool) => {
            tracing::info!("Connected to document store {:?} (database {:?})", url, name);
            Gateway::new(Arc::new(SqliteDocumentRepository::new(pool, name)))
        }
        Err(e) => {
            tracing::warn!("Could not open document store {:?}: {:#}", url, e);
            Gateway::disconnected()
        }
    }
}

pub fn open_pool(url: &str) -> anyhow::Result<DbPool> {
    match DatabaseLocation::parse(url) {
        // Each in-memory connection is its own database, so cap the pool at one.
        DatabaseLocation::Memory => {
            let pool = Pool::builder()
                .max_size(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .build(SqliteConnectionManager::memory())?;
            Ok(pool)
        }
        DatabaseLocation::File(path) => create_pool(path),
    }
}

pub fn create_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // busy_timeout and synchronous are per connection; journal_mode sticks to the file.
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )
    });
    let pool = Pool::builder().max_size(8).build(manager)?;

    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}
