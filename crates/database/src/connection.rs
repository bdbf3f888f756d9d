use crate::error::DbError;
use configuration::Settings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;

/// Establishes a connection pool to the PostgreSQL database.
///
/// `DATABASE_URL` wins when it is set; otherwise the options are assembled from
/// the individual `db_*` settings. The pool can be cloned and shared across
/// every request handler.
pub async fn connect(settings: &Settings) -> Result<PgPool, DbError> {
    let options = connect_options(settings)?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        host = %settings.db_host,
        database = %settings.db_name,
        "Connected to the database."
    );
    Ok(pool)
}

fn connect_options(settings: &Settings) -> Result<PgConnectOptions, DbError> {
    match settings.database_url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => PgConnectOptions::from_str(url)
            .map_err(|e| DbError::ConnectionConfigError(e.to_string())),
        None => Ok(PgConnectOptions::new()
            .host(&settings.db_host)
            .port(settings.db_port)
            .username(&settings.db_user)
            .password(&settings.db_password)
            .database(&settings.db_name)),
    }
}

/// Applies the embedded migrations, creating the `persons` table on first start.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
