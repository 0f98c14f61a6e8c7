//! ghstore - File storage on a GitHub repository branch
//!
//! ghstore exposes a repository branch through file-storage operations
//! (read, write, delete, list, stat) plus atomic multi-file commits. Every
//! mutation becomes a commit; lost updates are detected through the
//! remote's per-file SHA check and non-forcing ref updates.
//!
//! # Architecture
//!
//! - [`storage`] - Session, writer, batch and the error taxonomy
//! - [`remote`] - Transport boundary (`RemoteStore`), GitHub REST client,
//!   in-memory mock
//! - [`core`] - Paths, domain types and configuration
//! - [`auth`] - Bearer-token supply
//! - [`cli`] - Command-line front-end
//!
//! # Correctness Invariants
//!
//! 1. Validation and lifecycle errors are raised before any network call
//! 2. One commit per writer finalize, per delete, per non-empty batch
//! 3. A batch never overwrites a concurrent commit; it reports a conflict
//! 4. Credentials never appear in logs, errors or `Debug` output

pub mod auth;
pub mod cli;
pub mod core;
pub mod remote;
pub mod storage;
