//! Entity module - `SeaORM` entity definitions for the bootstrap's utility tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod process_log;
pub mod project_metadata;

// Re-export specific types to avoid conflicts
pub use process_log::{
    Column as ProcessLogColumn, Entity as ProcessLog, Model as ProcessLogModel,
};
pub use project_metadata::{
    Column as ProjectMetadataColumn, Entity as ProjectMetadata, Model as ProjectMetadataModel,
};
