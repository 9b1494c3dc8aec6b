//! Project metadata entity - key/value settings for the project database.
//!
//! Besides the model, this module owns the update hook that keeps
//! `updated_at` honest: callers can never pick its value on update, and
//! `created_at` cannot be rewritten after insert. On `PostgreSQL` the
//! server-side `update_project_metadata_updated_at` trigger is the source of
//! the timestamp and the hook only strips caller-supplied values; on other
//! backends the hook stamps the current UTC time itself, and the `SQLite`
//! trigger covers writes that never pass through the hook.

use crate::db::clock;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, DbBackend};
use serde::{Deserialize, Serialize};

/// Project metadata database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_metadata")]
pub struct Model {
    /// Sequential identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Setting name (e.g. `"srid"`), unique across the table
    #[sea_orm(unique)]
    pub key: String,
    /// Free-text setting value
    #[sea_orm(column_type = "Text", nullable)]
    pub value: Option<String>,
    /// When the row was inserted
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
}

/// `ProjectMetadata` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// Whether timestamps are owned by server-side defaults and triggers.
fn server_maintains_timestamps(backend: DbBackend) -> bool {
    backend == DbBackend::Postgres
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let server_side = server_maintains_timestamps(db.get_database_backend());
        let now = clock::utc_now_millis();

        if insert {
            let created = self
                .created_at
                .take()
                .or_else(|| (!server_side).then_some(now));
            match created {
                Some(ts) => {
                    self.created_at = ActiveValue::Set(ts);
                    self.updated_at = ActiveValue::Set(ts);
                }
                None => self.updated_at = ActiveValue::NotSet,
            }
        } else {
            self.created_at = ActiveValue::NotSet;
            self.updated_at = if server_side {
                ActiveValue::NotSet
            } else {
                ActiveValue::Set(now)
            };
        }

        Ok(self)
    }
}
