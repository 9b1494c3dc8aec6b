//! Where "now" comes from.
//!
//! On `PostgreSQL` every timestamp and date written by this crate is read from
//! the server, so it agrees with the `CURRENT_TIMESTAMP` defaults and the
//! `updated_at` trigger (both in the session time zone). Other backends use
//! the client's UTC clock, truncated to the millisecond precision that
//! `SQLite`'s `strftime('%f')` produces.

use crate::errors::Result;
use chrono::{NaiveDateTime, SubsecRound, Utc};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};

/// Client-side UTC time at millisecond precision.
#[must_use]
pub fn utc_now_millis() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(3)
}

/// Current timestamp as the database would stamp it.
pub async fn current_timestamp<C>(db: &C) -> Result<NaiveDateTime>
where
    C: ConnectionTrait,
{
    match db.get_database_backend() {
        DbBackend::Postgres => {
            let row = db
                .query_one(Statement::from_string(
                    DbBackend::Postgres,
                    "SELECT LOCALTIMESTAMP AS now",
                ))
                .await?
                .ok_or_else(|| DbErr::RecordNotFound("LOCALTIMESTAMP".to_string()))?;
            Ok(row.try_get::<NaiveDateTime>("", "now")?)
        }
        _ => Ok(utc_now_millis()),
    }
}

/// Today's date as `YYYY-MM-DD` text, from the server on `PostgreSQL`.
pub async fn current_date<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    match db.get_database_backend() {
        DbBackend::Postgres => {
            let row = db
                .query_one(Statement::from_string(
                    DbBackend::Postgres,
                    "SELECT CURRENT_DATE::text AS today",
                ))
                .await?
                .ok_or_else(|| DbErr::RecordNotFound("CURRENT_DATE".to_string()))?;
            Ok(row.try_get::<String>("", "today")?)
        }
        _ => Ok(Utc::now().date_naive().format("%Y-%m-%d").to_string()),
    }
}
