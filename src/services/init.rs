//! Startup helpers:
//! - database connection + migrations
//! - catalog bootstrap (dataset load + snapshot build)
//!
//! This module centralizes bits that would otherwise live in `main.rs`.

use std::path::Path;

use anyhow::Result;
use rand::SeedableRng;

use crate::catalog::{loader, Catalog};
use crate::config::Config;

/// Initialize the SQLite connection pool and run migrations.
///
/// Creates the parent directory for the database file (if applicable) and
/// opens the pool with `create_if_missing(true)`.
pub async fn init_db(config: &Config) -> Result<sqlx::SqlitePool> {
    let db_url = &config.database.url;
    tracing::info!("Connecting to database: {}", db_url);

    let db_path = db_url.strip_prefix("sqlite://").unwrap_or(db_url);
    let db_file_path = Path::new(db_path);

    if let Some(parent) = db_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }
    }

    let connect_options = sqlx::sqlite::SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(connect_options)
        .await?;

    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Load the event dataset and build the feed snapshot.
///
/// The sponsored shuffle happens exactly once here. An optional seed pins the
/// ordering, which is what the deployment uses to keep the feed stable across
/// a restart within the same day.
pub fn init_catalog(config: &Config) -> Result<Catalog> {
    let events = loader::load_events(Path::new(&config.catalog.events_path))?;

    let catalog = match config.catalog.shuffle_seed {
        Some(seed) => {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            Catalog::build(events, &mut rng)
        }
        None => Catalog::build(events, &mut rand::thread_rng()),
    };

    tracing::info!(
        "Catalog snapshot built: {} content items",
        catalog.content_len()
    );

    Ok(catalog)
}
