//! Process log entity - one row per run of an external batch process.
//!
//! The table only defines shape; every column is nullable and nothing is
//! enforced beyond the column types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Process log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "process_log")]
pub struct Model {
    /// Sequential identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Name of the batch process (e.g. `"load_osm_network"`)
    pub process_name: Option<String>,
    /// Free-form status; the helpers write `"running"`, `"success"` or `"failed"`
    pub status: Option<String>,
    /// Outcome or error message
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,
    /// When the run started
    pub started_at: Option<DateTime>,
    /// When the run finished, `None` while running
    pub finished_at: Option<DateTime>,
    /// Actor that recorded the run; defaults to the connection role on `PostgreSQL`
    pub created_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
