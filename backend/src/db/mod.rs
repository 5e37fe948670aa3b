pub mod corpus;
pub mod corpus_models;
pub mod corpus_schema;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::logger;

pub const CORPUS_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn create_database_connection(db_path: &Path) -> Result<SqliteConnection> {
    let db_url = db_path.to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid database path: {:?}", db_path))?;

    let conn = SqliteConnection::establish(db_url)
        .with_context(|| format!("Failed to open database: {}", db_url))?;
    Ok(conn)
}

/// Creates the corpus tables if they are absent. Safe to run on every start.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    conn.run_pending_migrations(CORPUS_MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to execute pending database migrations: {}", e))?;
    Ok(())
}

/// Opens (creating when missing) the corpus database and ensures its schema.
pub fn open_corpus_db(db_path: &Path) -> Result<SqliteConnection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
        }
    }

    logger::info(&format!("Opening corpus database: {}", db_path.display()));
    let mut conn = create_database_connection(db_path)?;
    run_migrations(&mut conn)?;
    Ok(conn)
}

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// User table names in the database, sorted.
pub fn get_table_names(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name;",
    )
    .load(conn)?;
    Ok(tables.into_iter().map(|t| t.name).collect())
}
