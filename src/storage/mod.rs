//! storage
//!
//! File-storage semantics over a Git hosting repository branch.
//!
//! # Architecture
//!
//! - [`Backend`] is the session. It owns the transport and the closed flag
//!   and runs the single-round-trip operations.
//! - [`ObjectWriter`] buffers one object and commits it on finalize.
//! - [`Batch`] commits many intents as one commit with an optimistic ref
//!   update.
//! - [`StorageError`] is the closed error taxonomy; [`classify`] is the only
//!   place transport errors are translated into it.
//!
//! Every mutation is a commit on the session branch. Writes and deletes of
//! single objects rely on the remote's per-file SHA check to detect lost
//! updates; batches rely on the non-forcing ref update.

mod backend;
mod batch;
mod error;
mod features;
mod reader;
mod writer;

pub use backend::{Backend, BackendSettings};
pub use batch::{Batch, DEFAULT_BATCH_MESSAGE};
pub use error::{classify, StorageError};
pub use features::{Features, HashKind};
pub use writer::ObjectWriter;
