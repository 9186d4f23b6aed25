use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/mealplan-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Open a pool sized by [`DbConfig::max_connections`].
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    connect(&config.database_url, config.max_connections).await
}

async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(url)
        .await
        .with_context(|| format!("failed to connect to database at {url}"))
}

/// Apply the embedded migrations that have not run yet.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;
    info!(migrations = MIGRATOR.migrations.len(), "database schema is current");
    Ok(())
}

/// Create the configured database through the `postgres` maintenance
/// database unless it already exists. Returns whether it was created.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<bool> {
    let db_name = config.checked_database_name()?;
    let maint_pool = connect(&config.maintenance_url(), 1).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&maint_pool)
            .await
            .context("failed to query pg_database")?;

    if !exists {
        maint_pool
            .execute(format!("CREATE DATABASE {db_name}").as_str())
            .await
            .with_context(|| format!("failed to create database {db_name}"))?;
    }
    info!(db = db_name, created = !exists, "database available");

    maint_pool.close().await;
    Ok(!exists)
}

/// Count meal plans by activity: `(active, soft_deleted)`.
///
/// Printed by `mealplan db-init` once migrations have run.
pub async fn plan_counts(pool: &PgPool) -> Result<(i64, i64)> {
    let counts: (i64, i64) = sqlx::query_as(
        "SELECT \
             COUNT(*) FILTER (WHERE is_active), \
             COUNT(*) FILTER (WHERE NOT is_active) \
         FROM meal_plans",
    )
    .fetch_one(pool)
    .await
    .context("failed to count meal plans")?;

    Ok(counts)
}
