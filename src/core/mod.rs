//! core
//!
//! Domain types, path rules and configuration.
//!
//! # Modules
//!
//! - [`paths`] - Path validation and normalization
//! - [`types`] - Repository identity, commit metadata, stat results, batch intents
//! - [`config`] - Configuration schema and loading
//!
//! Nothing in here performs network I/O.

pub mod config;
pub mod paths;
pub mod types;
