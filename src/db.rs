use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Builds a connection pool for the database at [db_url]. Connections are established lazily,
/// so this only fails if the URL cannot be parsed.
pub fn connect_sqlx(db_url: &str, max_connections: u32) -> Result<PgPool, anyhow::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy(db_url)
        .context("building the database connection pool")
}

/// Applies the schema migrations bundled in the "migrations" directory
pub async fn migrate(pool: &PgPool) -> Result<(), anyhow::Error> {
    sqlx::migrate!()
        .run(pool)
        .await
        .context("running database migrations")?;

    Ok(())
}
