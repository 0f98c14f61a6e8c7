//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! Each handler takes the open session and the invocation's cancellation
//! token, performs one storage operation (or one batch), and prints the
//! result.

mod apply;
mod objects;

pub use apply::{apply, parse_put};
pub use objects::{cat, ls, put, rm, stat};

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use super::args::Command;
use crate::storage::Backend;

/// Run one parsed command.
pub async fn dispatch(command: Command, backend: &Backend, cancel: &CancellationToken) -> Result<()> {
    match command {
        Command::Cat {
            path,
            offset,
            limit,
            reference,
        } => cat(backend, &path, offset, limit, reference, cancel).await,
        Command::Put { path, file } => put(backend, &path, file.as_deref(), cancel).await,
        Command::Rm { path } => rm(backend, &path, cancel).await,
        Command::Ls { prefix } => ls(backend, &prefix, cancel).await,
        Command::Stat { path } => stat(backend, &path, cancel).await,
        Command::Apply {
            message,
            puts,
            deletes,
        } => apply(backend, &message, &puts, &deletes, cancel).await,
    }
}
