//! st-core - Core library for Stratum
//!
//! Shared types for the migration engine: project configuration,
//! coded error types, script checksums, and the migration catalog
//! (on-disk script discovery and ordering).

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod error;

pub use catalog::{Catalog, MigrationDescriptor};
pub use checksum::compute_checksum;
pub use config::Config;
pub use error::{CoreError, CoreResult};
