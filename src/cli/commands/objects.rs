//! cli::commands::objects
//!
//! Single-object commands: cat, put, rm, ls, stat.
//!
//! # Example
//!
//! ```bash
//! echo hello | ghstore put notes/today.md
//! ghstore cat notes/today.md --offset 1 --limit 3
//! ghstore stat notes
//! ghstore ls notes
//! ghstore rm notes/today.md
//! ```

use std::path::Path;

use anyhow::{Context as _, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::core::types::{ObjectKind, ReadOptions};
use crate::storage::Backend;

/// Print an object's content.
pub async fn cat(
    backend: &Backend,
    path: &str,
    offset: u64,
    limit: Option<u64>,
    reference: Option<String>,
    cancel: &CancellationToken,
) -> Result<()> {
    let options = ReadOptions {
        offset,
        limit,
        reference,
    };
    let content = backend.read(path, &options, cancel).await?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&content).await?;
    stdout.flush().await?;
    Ok(())
}

/// Upload a local file, or stdin, as one commit.
pub async fn put(
    backend: &Backend,
    path: &str,
    file: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<()> {
    let content = match file {
        Some(file) if file != Path::new("-") => std::fs::read(file)
            .with_context(|| format!("failed to read '{}'", file.display()))?,
        _ => {
            let mut buffer = Vec::new();
            tokio::io::stdin().read_to_end(&mut buffer).await?;
            buffer
        }
    };

    let size = content.len();
    backend.write(path, content, cancel).await?;
    println!("wrote {} ({} bytes)", path, size);
    Ok(())
}

/// Delete one object.
pub async fn rm(backend: &Backend, path: &str, cancel: &CancellationToken) -> Result<()> {
    backend.delete(path, cancel).await?;
    println!("deleted {}", path);
    Ok(())
}

/// List file paths under a prefix, one per line.
pub async fn ls(backend: &Backend, prefix: &str, cancel: &CancellationToken) -> Result<()> {
    for path in backend.list(prefix, cancel).await? {
        println!("{}", path);
    }
    Ok(())
}

/// Describe one path.
pub async fn stat(backend: &Backend, path: &str, cancel: &CancellationToken) -> Result<()> {
    let info = backend.stat(path, cancel).await?;
    let shown = if info.path.is_empty() { "/" } else { &info.path };
    match info.kind {
        ObjectKind::Directory => println!("{}\tdirectory", shown),
        ObjectKind::File { sha, size } => println!("{}\tfile\t{}\t{}", shown, size, sha),
    }
    Ok(())
}
