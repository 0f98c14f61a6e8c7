//! remote
//!
//! Transport to the Git hosting API.
//!
//! # Architecture
//!
//! The [`RemoteStore`] trait is the only thing the storage layer knows about
//! the network. It is obtained through [`create_remote`] (or injected
//! directly, which is how tests use [`mock::MockRemote`]).
//!
//! The transport reports failures as raw [`RemoteError`]s; mapping them to
//! storage errors happens in [`crate::storage`].
//!
//! # Modules
//!
//! - `traits`: Core [`RemoteStore`] trait and wire-level types
//! - [`github`]: GitHub REST implementation
//! - [`mock`]: In-memory repository for deterministic testing
//! - `factory`: Transport creation from configuration

mod factory;
pub mod github;
pub mod mock;
mod traits;

pub use factory::{create_remote, token_host};
pub use traits::*;
