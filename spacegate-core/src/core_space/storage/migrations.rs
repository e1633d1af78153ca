//! Database migrations for Spaces
//!
//! Provides versioned migrations for the Space storage schema.
//! Each migration is applied atomically and tracked in the schema_version table.

use super::super::error::DataError;
use crate::types::Timestamp;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::info;

/// Current schema version
pub const CURRENT_SPACE_SCHEMA_VERSION: i32 = 2;

/// Migration descriptor
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub up_sql: &'static str,
}

/// All available migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Initial Spaces and memberships schema",
            up_sql: r#"
                CREATE TABLE IF NOT EXISTS space_schema_version (
                    version INTEGER PRIMARY KEY,
                    applied_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS spaces (
                    id BLOB PRIMARY KEY,                    -- SpaceId (32 bytes)
                    name TEXT NOT NULL CHECK(length(name) BETWEEN 4 AND 20),
                    slug TEXT NOT NULL CHECK(length(slug) BETWEEN 4 AND 16),
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );

                CREATE UNIQUE INDEX IF NOT EXISTS spaces_slug_key ON spaces(slug);

                CREATE TABLE IF NOT EXISTS space_members (
                    space_id BLOB NOT NULL,                 -- SpaceId
                    user_id TEXT NOT NULL,                  -- UserId
                    role TEXT NOT NULL CHECK(role IN ('ADMIN', 'USER')),
                    joined_at INTEGER NOT NULL,
                    PRIMARY KEY (space_id, user_id),
                    FOREIGN KEY (space_id) REFERENCES spaces(id) ON DELETE CASCADE
                );

                CREATE INDEX IF NOT EXISTS idx_space_members_user ON space_members(user_id);
            "#,
        },
        Migration {
            version: 2,
            description: "Users for the built-in identity provider",
            up_sql: r#"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,                    -- UserId (uuid)
                    username TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );

                CREATE UNIQUE INDEX IF NOT EXISTS users_username_key ON users(username);
            "#,
        },
    ]
}

/// Get current schema version from database
fn get_current_version(pool: &Pool<SqliteConnectionManager>) -> Result<i32, DataError> {
    let conn = pool.get()?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS space_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn.query_row(
        "SELECT MAX(version) FROM space_schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version.unwrap_or(0))
}

/// Run all pending migrations
pub fn migrate(pool: &Pool<SqliteConnectionManager>) -> Result<(), DataError> {
    let current_version = get_current_version(pool)?;

    let pending_migrations: Vec<_> = get_migrations()
        .into_iter()
        .filter(|m| m.version > current_version)
        .collect();

    if pending_migrations.is_empty() {
        return Ok(());
    }

    let mut conn = pool.get()?;

    for migration in pending_migrations {
        let tx = conn.transaction()?;

        tx.execute_batch(migration.up_sql)?;
        tx.execute(
            "INSERT INTO space_schema_version (version, applied_at) VALUES (?, ?)",
            params![migration.version, Timestamp::now().as_millis() as i64],
        )?;

        tx.commit()?;

        info!(
            version = migration.version,
            "Applied migration: {}", migration.description
        );
    }

    Ok(())
}

/// Get the latest migration version available
pub fn get_latest_version() -> i32 {
    get_migrations().iter().map(|m| m.version).max().unwrap_or(0)
}
