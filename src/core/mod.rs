//! Core operations over the bootstrapped state.
//!
//! Framework-agnostic and generic over `ConnectionTrait`, so each function
//! runs on a plain connection or inside a transaction.

pub mod metadata;
pub mod process_log;
pub mod spatial;
