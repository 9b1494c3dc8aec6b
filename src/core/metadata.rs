//! Project metadata operations - typed access to the `project_metadata` key/value table.
//!
//! All writes go through the entity's `ActiveModel`, so the update hook in
//! [`crate::entities::project_metadata`] applies: `updated_at` is always
//! refreshed and `created_at` is never touched by an update.

use crate::{
    entities::{ProjectMetadata, project_metadata},
    errors::{Error, Result},
};
use sea_orm::{DbErr, QueryOrder, Set, SqlErr, prelude::*};
use tracing::{debug, info, instrument};

/// Seeded key holding the project name
pub const PROJECT_NAME_KEY: &str = "project_name";
/// Seeded key holding the project version
pub const VERSION_KEY: &str = "version";
/// Seeded key holding the bootstrap date (`YYYY-MM-DD`)
pub const CREATED_DATE_KEY: &str = "created_date";
/// Seeded key holding the working SRID
pub const SRID_KEY: &str = "srid";

/// Longest key accepted by the `VARCHAR(100)` column
pub const MAX_KEY_LEN: usize = 100;

fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::Config {
            message: "Metadata key cannot be empty".to_string(),
        });
    }
    if key.chars().count() > MAX_KEY_LEN {
        return Err(Error::Config {
            message: format!("Metadata key longer than {MAX_KEY_LEN} characters"),
        });
    }
    Ok(())
}

fn map_unique_violation(err: DbErr, key: &str) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateKey {
            key: key.to_string(),
        },
        _ => Error::Database(err),
    }
}

/// Finds the metadata row for `key`.
pub async fn get_metadata<C>(db: &C, key: &str) -> Result<Option<project_metadata::Model>>
where
    C: ConnectionTrait,
{
    ProjectMetadata::find()
        .filter(project_metadata::Column::Key.eq(key))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the value stored under `key`, `None` if the key is absent or its value is NULL.
pub async fn get_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    Ok(get_metadata(db, key).await?.and_then(|row| row.value))
}

/// Lists every metadata row in insertion order.
pub async fn list_metadata<C>(db: &C) -> Result<Vec<project_metadata::Model>>
where
    C: ConnectionTrait,
{
    ProjectMetadata::find()
        .order_by_asc(project_metadata::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a new metadata row.
///
/// # Errors
/// `Error::DuplicateKey` if `key` already exists; `Error::Config` for an
/// empty or over-long key.
#[instrument(skip(db, value))]
pub async fn insert_metadata<C>(
    db: &C,
    key: &str,
    value: Option<String>,
) -> Result<project_metadata::Model>
where
    C: ConnectionTrait,
{
    validate_key(key)?;

    let row = project_metadata::ActiveModel {
        key: Set(key.to_string()),
        value: Set(value),
        ..Default::default()
    };

    let inserted = row
        .insert(db)
        .await
        .map_err(|e| map_unique_violation(e, key))?;
    info!("Inserted metadata key '{}'", key);
    Ok(inserted)
}

/// Replaces the value of an existing key.
///
/// The caller never controls `updated_at`; it ends up at the time of this write.
///
/// # Errors
/// `Error::MetadataNotFound` if the key does not exist.
#[instrument(skip(db, value))]
pub async fn set_value<C>(
    db: &C,
    key: &str,
    value: Option<String>,
) -> Result<project_metadata::Model>
where
    C: ConnectionTrait,
{
    let existing = get_metadata(db, key)
        .await?
        .ok_or_else(|| Error::MetadataNotFound {
            key: key.to_string(),
        })?;

    let mut active_model: project_metadata::ActiveModel = existing.into();
    active_model.value = Set(value);
    let updated = active_model.update(db).await?;
    debug!("Updated metadata key '{}' at {}", key, updated.updated_at);
    Ok(updated)
}

/// Updates `key` if present, inserts it otherwise.
pub async fn upsert_value<C>(
    db: &C,
    key: &str,
    value: Option<String>,
) -> Result<project_metadata::Model>
where
    C: ConnectionTrait,
{
    if get_metadata(db, key).await?.is_some() {
        set_value(db, key, value).await
    } else {
        insert_metadata(db, key, value).await
    }
}

/// Reads the project's working SRID from the `srid` key.
///
/// # Errors
/// `Error::MetadataNotFound` when unset; `Error::InvalidSrid` when the stored
/// text is not a positive integer.
pub async fn project_srid<C>(db: &C) -> Result<i32>
where
    C: ConnectionTrait,
{
    let raw = get_value(db, SRID_KEY)
        .await?
        .ok_or_else(|| Error::MetadataNotFound {
            key: SRID_KEY.to_string(),
        })?;

    match raw.trim().parse::<i32>() {
        Ok(srid) if srid > 0 => Ok(srid),
        _ => Err(Error::InvalidSrid { value: raw }),
    }
}
