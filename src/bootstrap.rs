//! The bootstrap run.
//!
//! Steps, in order, all inside one transaction:
//!
//! 1. enable extensions (PostGIS, topology)
//! 2. create the data schemas
//! 3. create `project_metadata` and `process_log`
//! 4. install the `updated_at` trigger
//! 5. create the `spatial_tables` view
//! 6. seed the four project metadata keys
//!
//! Steps 1, 2 and 5 need `PostgreSQL`; on `SQLite` they are skipped with a
//! warning, the tables come from the entity definitions and an `AFTER UPDATE`
//! trigger stands in for the plpgsql one. Any failing statement aborts the run
//! and rolls everything back.
//!
//! `created_date` is the server's `CURRENT_DATE` on `PostgreSQL` and the UTC
//! date elsewhere.

use crate::{
    config::BootstrapConfig,
    core::metadata::{
        self, CREATED_DATE_KEY, PROJECT_NAME_KEY, SRID_KEY, VERSION_KEY,
    },
    db::{
        clock,
        schema::{self, postgres},
    },
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, TransactionTrait};
use tracing::{debug, info, instrument, warn};

/// What a bootstrap run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Extensions enabled (or confirmed present)
    pub extensions: Vec<String>,
    /// Schemas created (or confirmed present)
    pub schemas: Vec<String>,
    /// Utility tables created (or confirmed present)
    pub tables: Vec<String>,
    /// Whether the server-side `updated_at` trigger was installed
    pub trigger_installed: bool,
    /// Whether the `spatial_tables` view was created
    pub spatial_view_created: bool,
    /// Metadata keys inserted by this run
    pub seeded_keys: Vec<String>,
    /// Metadata keys left untouched because they already existed
    pub skipped_keys: Vec<String>,
}

impl BootstrapReport {
    /// One-line summary for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} extensions, {} schemas, {} tables, trigger: {}, spatial view: {}, \
             seeded {} keys, skipped {} existing",
            self.extensions.len(),
            self.schemas.len(),
            self.tables.len(),
            if self.trigger_installed { "yes" } else { "no" },
            if self.spatial_view_created { "yes" } else { "no" },
            self.seeded_keys.len(),
            self.skipped_keys.len(),
        )
    }
}

/// The four metadata seeds, in insertion order.
#[must_use]
pub fn seed_values(config: &BootstrapConfig, today: &str) -> [(&'static str, String); 4] {
    [
        (PROJECT_NAME_KEY, config.project.name.clone()),
        (VERSION_KEY, config.project.version.clone()),
        (CREATED_DATE_KEY, today.to_string()),
        (SRID_KEY, config.project.srid.to_string()),
    ]
}

/// Runs the whole bootstrap against `db`.
///
/// # Errors
/// Configuration errors are reported before anything is executed; database
/// errors abort the run and roll back every step.
#[instrument(skip(db, config))]
pub async fn run(db: &DatabaseConnection, config: &BootstrapConfig) -> Result<BootstrapReport> {
    config.validate()?;

    let backend = db.get_database_backend();
    info!("Starting bootstrap on {:?} backend", backend);

    let txn = db.begin().await?;
    let mut report = BootstrapReport::default();

    match backend {
        DbBackend::Postgres => create_postgres_objects(&txn, config, &mut report).await?,
        DbBackend::Sqlite => {
            warn!("SQLite backend: skipping extensions, schemas and spatial view");
            schema::create_tables(&txn).await?;
            report.tables = vec!["project_metadata".to_string(), "process_log".to_string()];
            schema::create_sqlite_trigger(&txn).await?;
            info!("Trigger {} installed", schema::UPDATED_AT_TRIGGER);
            report.trigger_installed = true;
        }
        other => {
            return Err(Error::UnsupportedBackend {
                backend: format!("{other:?}"),
                operation: "bootstrap".to_string(),
            });
        }
    }

    let today = clock::current_date(&txn).await?;
    debug!("Seeding with created_date {}", today);
    seed_metadata(&txn, config, &today, &mut report).await?;

    txn.commit().await?;
    info!("Bootstrap complete: {}", report.summary());
    Ok(report)
}

async fn create_postgres_objects<C>(
    db: &C,
    config: &BootstrapConfig,
    report: &mut BootstrapReport,
) -> Result<()>
where
    C: ConnectionTrait,
{
    for extension in &config.database.extensions {
        db.execute_unprepared(&postgres::create_extension(extension))
            .await?;
        info!("Extension {} enabled", extension);
        report.extensions.push(extension.clone());
    }

    for schema_name in &config.database.schemas {
        db.execute_unprepared(&postgres::create_schema(schema_name))
            .await?;
        info!("Schema {} ensured", schema_name);
        report.schemas.push(schema_name.clone());
    }

    for (table, ddl) in [
        ("project_metadata", postgres::CREATE_PROJECT_METADATA),
        ("process_log", postgres::CREATE_PROCESS_LOG),
    ] {
        debug!("{}", ddl);
        db.execute_unprepared(ddl).await?;
        info!("Table public.{} ensured", table);
        report.tables.push(table.to_string());
    }

    db.execute_unprepared(postgres::CREATE_UPDATED_AT_FUNCTION)
        .await?;
    db.execute_unprepared(postgres::DROP_UPDATED_AT_TRIGGER)
        .await?;
    db.execute_unprepared(postgres::CREATE_UPDATED_AT_TRIGGER)
        .await?;
    info!("Trigger {} installed", schema::UPDATED_AT_TRIGGER);
    report.trigger_installed = true;

    db.execute_unprepared(postgres::CREATE_SPATIAL_VIEW).await?;
    info!("View public.{} created", schema::SPATIAL_VIEW);
    report.spatial_view_created = true;

    Ok(())
}

async fn seed_metadata<C>(
    db: &C,
    config: &BootstrapConfig,
    today: &str,
    report: &mut BootstrapReport,
) -> Result<()>
where
    C: ConnectionTrait,
{
    for (key, value) in seed_values(config, today) {
        if metadata::get_metadata(db, key).await?.is_some() {
            warn!("Metadata key '{}' already exists. Skipping.", key);
            report.skipped_keys.push(key.to_string());
            continue;
        }
        metadata::insert_metadata(db, key, Some(value)).await?;
        report.seeded_keys.push(key.to_string());
    }
    Ok(())
}
