//! DDL for the project database.
//!
//! `PostgreSQL` gets hand-written statements so the persisted layout
//! (`SERIAL`, `VARCHAR` lengths, `CURRENT_USER` default, the plpgsql trigger
//! and the PostGIS catalog view) is reproduced exactly. `SQLite` has no
//! schemas, extensions or PostGIS catalog, so only the two utility tables
//! (derived from the entity definitions) and an equivalent `updated_at`
//! trigger are created there.

use crate::entities::{ProcessLog, ProjectMetadata};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Schema};
use tracing::{debug, instrument};

/// Name of the timestamp-maintenance trigger on `project_metadata`
pub const UPDATED_AT_TRIGGER: &str = "update_project_metadata_updated_at";

/// Name of the read-only view over the PostGIS `geometry_columns` catalog
pub const SPATIAL_VIEW: &str = "spatial_tables";

/// `PostgreSQL` statements, executed in this order by the bootstrap run.
pub mod postgres {
    pub const CREATE_PROJECT_METADATA: &str = "CREATE TABLE IF NOT EXISTS public.project_metadata (
            id SERIAL PRIMARY KEY,
            key VARCHAR(100) UNIQUE NOT NULL,
            value TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )";

    pub const CREATE_PROCESS_LOG: &str = "CREATE TABLE IF NOT EXISTS public.process_log (
            id SERIAL PRIMARY KEY,
            process_name VARCHAR(200),
            status VARCHAR(50),
            message TEXT,
            started_at TIMESTAMP,
            finished_at TIMESTAMP,
            created_by VARCHAR(100) DEFAULT CURRENT_USER
        )";

    // Overwrites NEW.updated_at whatever the UPDATE statement supplied.
    pub const CREATE_UPDATED_AT_FUNCTION: &str = "CREATE OR REPLACE FUNCTION public.update_updated_at_column()
        RETURNS TRIGGER AS $$
        BEGIN
            NEW.updated_at = CURRENT_TIMESTAMP;
            RETURN NEW;
        END;
        $$ LANGUAGE plpgsql";

    pub const DROP_UPDATED_AT_TRIGGER: &str =
        "DROP TRIGGER IF EXISTS update_project_metadata_updated_at ON public.project_metadata";

    pub const CREATE_UPDATED_AT_TRIGGER: &str = "CREATE TRIGGER update_project_metadata_updated_at
        BEFORE UPDATE ON public.project_metadata
        FOR EACH ROW
        EXECUTE FUNCTION public.update_updated_at_column()";

    pub const CREATE_SPATIAL_VIEW: &str = "CREATE OR REPLACE VIEW public.spatial_tables AS
        SELECT
            f_table_schema AS schema_name,
            f_table_name AS table_name,
            f_geometry_column AS column_name,
            coord_dimension,
            srid,
            type AS geometry_type
        FROM geometry_columns
        ORDER BY f_table_schema, f_table_name";

    /// `CREATE EXTENSION` for a validated identifier.
    #[must_use]
    pub fn create_extension(name: &str) -> String {
        format!("CREATE EXTENSION IF NOT EXISTS {name}")
    }

    /// `CREATE SCHEMA` for a validated identifier.
    #[must_use]
    pub fn create_schema(name: &str) -> String {
        format!("CREATE SCHEMA IF NOT EXISTS {name}")
    }
}

/// `SQLite` statements.
pub mod sqlite {
    // SQLite cannot assign to NEW, so the row is stamped after the write.
    // recursive_triggers is off by default, so the inner UPDATE does not re-fire.
    pub const CREATE_UPDATED_AT_TRIGGER: &str = "CREATE TRIGGER IF NOT EXISTS update_project_metadata_updated_at
        AFTER UPDATE ON project_metadata
        FOR EACH ROW
        BEGIN
            UPDATE project_metadata
            SET updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE id = NEW.id;
        END";
}

/// Quotes an identifier for splicing into SQL, doubling embedded quotes.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Creates the utility tables from the entity definitions if they do not exist.
///
/// Used on backends without the hand-written `PostgreSQL` layout. Works on a
/// plain connection or inside a transaction.
#[instrument(skip(db))]
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut metadata_table = schema.create_table_from_entity(ProjectMetadata);
    metadata_table.if_not_exists();
    let mut process_log_table = schema.create_table_from_entity(ProcessLog);
    process_log_table.if_not_exists();

    debug!("Creating project_metadata and process_log from entity definitions");
    db.execute(builder.build(&metadata_table)).await?;
    db.execute(builder.build(&process_log_table)).await?;

    Ok(())
}

/// Installs the `SQLite` `updated_at` trigger if it does not exist.
#[instrument(skip(db))]
pub async fn create_sqlite_trigger<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    debug!("Installing {} on project_metadata", UPDATED_AT_TRIGGER);
    db.execute_unprepared(sqlite::CREATE_UPDATED_AT_TRIGGER).await?;
    Ok(())
}
