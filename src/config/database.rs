//! Database configuration module.
//!
//! Resolves the connection URL and opens a `SeaORM` connection. The URL comes
//! from `DATABASE_URL` when set; otherwise it is assembled from the
//! `POSTGRES_*` variables that the project's data-loading scripts share.

use crate::errors::{Error, Result};
use sea_orm::{Database, DatabaseConnection};
use tracing::{info, instrument};

/// Gets the database URL from the process environment.
///
/// # Errors
/// Returns `Error::Config` when `DATABASE_URL` is unset and `POSTGRES_USER`
/// or `POSTGRES_DB` is missing.
pub fn get_database_url() -> Result<String> {
    database_url_from(|name| std::env::var(name).ok())
}

/// Builds the database URL from an arbitrary variable lookup.
pub(crate) fn database_url_from<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
        return Ok(url);
    }

    let required = |name: &str| {
        lookup(name).ok_or_else(|| Error::Config {
            message: format!("DATABASE_URL is not set and {name} is missing"),
        })
    };
    let user = required("POSTGRES_USER")?;
    let database = required("POSTGRES_DB")?;
    let password = lookup("POSTGRES_PASSWORD").unwrap_or_default();
    let host = lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = lookup("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());

    if port.parse::<u16>().is_err() {
        return Err(Error::Config {
            message: format!("POSTGRES_PORT must be a port number, got '{port}'"),
        });
    }

    Ok(format!(
        "postgresql://{user}:{password}@{host}:{port}/{database}"
    ))
}

/// Replaces the password part of a URL so it can be logged.
#[must_use]
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host_part)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host_part}"),
        None => url.to_string(),
    }
}

/// Establishes a connection using [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    connect_from(|name| std::env::var(name).ok()).await
}

async fn connect_from<F>(lookup: F) -> Result<DatabaseConnection>
where
    F: Fn(&str) -> Option<String>,
{
    let database_url = database_url_from(lookup)?;
    connect(&database_url).await
}

/// Establishes a connection to an explicit URL.
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to {}", redact_url(database_url));
    Database::connect(database_url).await.map_err(Into::into)
}
