//! Process log helpers for external batch processes.
//!
//! The bootstrap itself never writes to `process_log`; these functions let the
//! data-loading jobs record a run when it starts and close it when it ends.
//! Start and finish times come from [`clock::current_timestamp`], so on
//! `PostgreSQL` they are server time like every other stamp in the database.

use crate::{
    db::clock,
    entities::{ProcessLog, process_log},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use std::fmt;
use tracing::{info, instrument, warn};

/// Status values written by the helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Started, not finished yet
    Running,
    /// Finished without error
    Success,
    /// Finished with an error
    Failed,
}

impl ProcessStatus {
    /// The string stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Parses a stored status; rows written by other tools may carry anything else.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "running" => Some(Self::Running),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records the start of a process run.
///
/// With `actor = None` the `created_by` column is left to the database
/// default, which on `PostgreSQL` is the role of the current connection.
#[instrument(skip(db))]
pub async fn start_process<C>(
    db: &C,
    process_name: &str,
    actor: Option<&str>,
) -> Result<process_log::Model>
where
    C: ConnectionTrait,
{
    if process_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Process name cannot be empty".to_string(),
        });
    }

    let mut entry = process_log::ActiveModel {
        process_name: Set(Some(process_name.to_string())),
        status: Set(Some(ProcessStatus::Running.to_string())),
        started_at: Set(Some(clock::current_timestamp(db).await?)),
        ..Default::default()
    };
    if let Some(actor) = actor {
        entry.created_by = Set(Some(actor.to_string()));
    }

    let inserted = entry.insert(db).await?;
    info!("Process '{}' started (log id {})", process_name, inserted.id);
    Ok(inserted)
}

/// Closes a run with a final status and optional message.
///
/// # Errors
/// `Error::ProcessNotFound` for an unknown id; `Error::Config` when
/// `status` is `Running`.
#[instrument(skip(db, message))]
pub async fn finish_process<C>(
    db: &C,
    id: i32,
    status: ProcessStatus,
    message: Option<String>,
) -> Result<process_log::Model>
where
    C: ConnectionTrait,
{
    if status == ProcessStatus::Running {
        return Err(Error::Config {
            message: "A process cannot finish with status 'running'".to_string(),
        });
    }

    let entry = ProcessLog::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::ProcessNotFound { id })?;

    if entry.finished_at.is_some() {
        warn!("Process log entry {} was already finished, overwriting", id);
    }

    let mut active_model: process_log::ActiveModel = entry.into();
    active_model.status = Set(Some(status.to_string()));
    active_model.message = Set(message);
    active_model.finished_at = Set(Some(clock::current_timestamp(db).await?));
    let updated = active_model.update(db).await?;

    info!("Process log entry {} finished: {}", id, status);
    Ok(updated)
}

/// Most recent runs first.
pub async fn list_recent_processes<C>(db: &C, limit: u64) -> Result<Vec<process_log::Model>>
where
    C: ConnectionTrait,
{
    ProcessLog::find()
        .order_by_desc(process_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}
