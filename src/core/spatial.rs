//! Spatial catalog queries over the `spatial_tables` view.
//!
//! The view is computed by PostGIS from `geometry_columns`, so these
//! operations only run against `PostgreSQL`. `geometry_columns` also lists
//! views and foreign tables; only ordinary tables, materialized views and
//! partitioned tables get an index.

use crate::{
    db::{SPATIAL_VIEW, quote_ident},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, DbBackend, FromQueryResult, Statement};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// One spatially typed column known to PostGIS
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct SpatialColumn {
    /// Schema containing the table
    pub schema_name: String,
    /// Table containing the column
    pub table_name: String,
    /// Geometry column name
    pub column_name: String,
    /// Number of coordinate dimensions (2, 3 or 4)
    pub coord_dimension: i32,
    /// Spatial reference identifier, 0 when unconstrained
    pub srid: i32,
    /// PostGIS geometry type, e.g. `"MULTIPOLYGON"`
    pub geometry_type: String,
}

/// Longest identifier `PostgreSQL` keeps (`NAMEDATALEN - 1`); longer names are truncated
const MAX_IDENTIFIER_LEN: usize = 63;

/// 32-bit FNV-1a, stable across builds and platforms.
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5, |hash: u32, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(0x0100_0193)
    })
}

impl SpatialColumn {
    /// Name of the GiST index created for this column.
    ///
    /// Names that would exceed 63 bytes are shortened and tagged with a hash
    /// of the full name, so they stay distinct and the same on every run.
    #[must_use]
    pub fn index_name(&self) -> String {
        let base = format!("idx_{}_{}", self.table_name, self.column_name);
        if base.len() + "_gist".len() <= MAX_IDENTIFIER_LEN {
            return format!("{base}_gist");
        }

        let mut keep = MAX_IDENTIFIER_LEN - "_gist".len() - "_00000000".len();
        while !base.is_char_boundary(keep) {
            keep -= 1;
        }
        format!("{}_{:08x}_gist", &base[..keep], fnv1a(base.as_bytes()))
    }

    fn create_index_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {}.{} USING GIST ({})",
            quote_ident(&self.index_name()),
            quote_ident(&self.schema_name),
            quote_ident(&self.table_name),
            quote_ident(&self.column_name),
        )
    }
}

fn require_postgres<C>(db: &C, operation: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    match db.get_database_backend() {
        DbBackend::Postgres => Ok(()),
        other => Err(Error::UnsupportedBackend {
            backend: format!("{other:?}"),
            operation: operation.to_string(),
        }),
    }
}

/// Lists every spatially typed column, ordered by schema then table.
#[instrument(skip(db))]
pub async fn list_spatial_columns<C>(db: &C) -> Result<Vec<SpatialColumn>>
where
    C: ConnectionTrait,
{
    require_postgres(db, "list_spatial_columns")?;

    let sql = format!(
        "SELECT schema_name::text, table_name::text, column_name::text, \
         coord_dimension, srid, geometry_type::text \
         FROM public.{SPATIAL_VIEW}"
    );
    let columns = SpatialColumn::find_by_statement(Statement::from_string(DbBackend::Postgres, sql))
        .all(db)
        .await?;
    debug!("Found {} spatial columns", columns.len());
    Ok(columns)
}

/// Spatial columns whose relation can carry an index.
async fn list_indexable_columns<C>(db: &C) -> Result<Vec<SpatialColumn>>
where
    C: ConnectionTrait,
{
    // r = table, m = materialized view, p = partitioned table
    let sql = format!(
        "SELECT s.schema_name::text, s.table_name::text, s.column_name::text, \
         s.coord_dimension, s.srid, s.geometry_type::text \
         FROM public.{SPATIAL_VIEW} s \
         JOIN pg_catalog.pg_namespace n ON n.nspname = s.schema_name \
         JOIN pg_catalog.pg_class c ON c.relnamespace = n.oid AND c.relname = s.table_name \
         WHERE c.relkind IN ('r', 'm', 'p')"
    );
    SpatialColumn::find_by_statement(Statement::from_string(DbBackend::Postgres, sql))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a GiST index on every indexable spatial column that lacks one.
///
/// Columns on views and foreign tables are skipped with a warning. Returns
/// the index names, existing ones included.
#[instrument(skip(db))]
pub async fn create_spatial_indices<C>(db: &C) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    require_postgres(db, "create_spatial_indices")?;

    let all = list_spatial_columns(db).await?;
    let indexable = list_indexable_columns(db).await?;
    for column in all.iter().filter(|c| !indexable.contains(*c)) {
        warn!(
            "Skipping {}.{}({}): relation cannot be indexed",
            column.schema_name, column.table_name, column.column_name
        );
    }

    let mut created = Vec::new();
    for column in indexable {
        db.execute_unprepared(&column.create_index_sql()).await?;
        info!(
            "Spatial index {} ensured on {}.{}({})",
            column.index_name(),
            column.schema_name,
            column.table_name,
            column.column_name
        );
        created.push(column.index_name());
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn as_row(column: &SpatialColumn) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("schema_name", Value::from(column.schema_name.clone())),
            ("table_name", Value::from(column.table_name.clone())),
            ("column_name", Value::from(column.column_name.clone())),
            ("coord_dimension", Value::from(column.coord_dimension)),
            ("srid", Value::from(column.srid)),
            ("geometry_type", Value::from(column.geometry_type.clone())),
        ])
    }

    fn sample_column() -> SpatialColumn {
        SpatialColumn {
            schema_name: "raw_data".to_string(),
            table_name: "comunas_rm_censo".to_string(),
            column_name: "geometry".to_string(),
            coord_dimension: 2,
            srid: 32719,
            geometry_type: "MULTIPOLYGON".to_string(),
        }
    }

    #[test]
    fn test_index_sql() {
        let column = sample_column();
        assert_eq!(column.index_name(), "idx_comunas_rm_censo_geometry_gist");
        assert_eq!(
            column.create_index_sql(),
            "CREATE INDEX IF NOT EXISTS \"idx_comunas_rm_censo_geometry_gist\" \
             ON \"raw_data\".\"comunas_rm_censo\" USING GIST (\"geometry\")"
        );
    }

    #[tokio::test]
    async fn test_sqlite_is_unsupported() -> Result<()> {
        let db = setup_test_db().await?;

        let result = list_spatial_columns(&db).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::UnsupportedBackend { operation, .. } if operation == "list_spatial_columns"
        ));
        assert!(matches!(
            create_spatial_indices(&db).await.unwrap_err(),
            Error::UnsupportedBackend { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_long_index_name_fits_identifier_limit() {
        let mut column = sample_column();
        column.table_name = "red_vial_primaria_region_metropolitana_santiago_2024".to_string();
        column.column_name = "geometria_proyectada_utm".to_string();

        let name = column.index_name();
        assert!(name.len() <= MAX_IDENTIFIER_LEN);
        assert!(name.starts_with("idx_red_vial_primaria"));
        assert!(name.ends_with("_gist"));
        assert_eq!(name, column.index_name());

        let mut other = column.clone();
        other.column_name = "geometria_proyectada_wgs".to_string();
        assert_ne!(name, other.index_name());

        column.table_name = "ñandú".repeat(20);
        assert!(column.index_name().len() <= MAX_IDENTIFIER_LEN);
    }

    #[tokio::test]
    async fn test_views_are_not_indexed() -> Result<()> {
        let table = sample_column();
        let view = SpatialColumn {
            table_name: "comunas_rm_censo_v".to_string(),
            ..sample_column()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![as_row(&table), as_row(&view)], vec![as_row(&table)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let created = create_spatial_indices(&db).await?;
        assert_eq!(created, ["idx_comunas_rm_censo_geometry_gist"]);

        let log = db.into_transaction_log();
        let index_statements: Vec<_> = log
            .iter()
            .flat_map(|t| t.statements())
            .filter(|s| s.sql.starts_with("CREATE INDEX"))
            .collect();
        assert_eq!(index_statements.len(), 1);
        assert!(!index_statements[0].sql.contains("comunas_rm_censo_v"));
        Ok(())
    }
}
