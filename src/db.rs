//! Database pool creation and schema management

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::{config::DatabaseConfig, error::CatalogResult};

/// Schema statements, one per table or index. Executed in order; every
/// statement is idempotent so the pass can run on each start-up.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS genres (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK (length(name) <= 200)
    )",
    // Uniqueness compares the lowered projection, not the raw value
    "CREATE UNIQUE INDEX IF NOT EXISTS genre_name_case_insensitive_unique
        ON genres (lower(name))",
    "CREATE TABLE IF NOT EXISTS languages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK (length(name) <= 100)
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS language_name_case_insensitive_unique
        ON languages (lower(name))",
    "CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL CHECK (length(first_name) <= 100),
        last_name TEXT NOT NULL CHECK (length(last_name) <= 100),
        date_of_birth TEXT,
        date_of_death TEXT
    )",
    "CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL CHECK (length(title) <= 200),
        summary TEXT NOT NULL CHECK (length(summary) <= 1000),
        isbn TEXT NOT NULL UNIQUE CHECK (length(isbn) <= 13),
        author_id INTEGER REFERENCES authors(id) ON DELETE RESTRICT,
        language_id INTEGER REFERENCES languages(id) ON DELETE RESTRICT
    )",
    "CREATE TABLE IF NOT EXISTS book_genres (
        book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
        genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
        PRIMARY KEY (book_id, genre_id)
    )",
    "CREATE TABLE IF NOT EXISTS book_instances (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        book_id INTEGER REFERENCES books(id) ON DELETE RESTRICT,
        imprint TEXT NOT NULL CHECK (length(imprint) <= 200),
        due_back TEXT,
        status TEXT NOT NULL DEFAULT 'm' CHECK (status IN ('m', 'o', 'a', 'r'))
    )",
];

/// Create a connection pool for the configured database, with foreign-key
/// enforcement enabled on every connection.
pub async fn connect(config: &DatabaseConfig) -> CatalogResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Apply the catalog schema. Safe to call repeatedly.
pub async fn init_schema(pool: &SqlitePool) -> CatalogResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("catalog schema ready");
    Ok(())
}
