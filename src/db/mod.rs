//! Database layout: DDL for the utility tables, trigger and catalog view,
//! plus the server-or-client clock used for written timestamps.

pub mod clock;
pub mod schema;

pub use schema::{
    SPATIAL_VIEW, UPDATED_AT_TRIGGER, create_sqlite_trigger, create_tables, quote_ident,
};
