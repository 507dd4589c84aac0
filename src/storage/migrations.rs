/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// It ensures the database has all the required tables and indexes.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version < CURRENT_VERSION {
        tracing::info!("Migrating database schema from v{} to v{}", current_version, CURRENT_VERSION);
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    }

    Ok(())
}

/// Get the current database schema version
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get::<_, i32>(0)
        })
        .unwrap_or(0);

    Ok(version)
}

fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    Ok(())
}

/// Migration to version 1: users, habits, completions and the key-value table
///
/// Completions carry no foreign key to habits; the document-store model
/// deletes them explicitly when a habit goes away.
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            salt TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS completions (
            id TEXT PRIMARY KEY,
            habit_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id);
        CREATE INDEX IF NOT EXISTS idx_completions_user ON completions(user_id);
        CREATE INDEX IF NOT EXISTS idx_completions_habit_date ON completions(habit_id, date);",
    )
    .map_err(|e| StorageError::Migration(format!("v1 failed: {}", e)))?;

    Ok(())
}
