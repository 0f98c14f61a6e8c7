//! cli::commands::apply
//!
//! Several writes and deletes as one commit.

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use tokio_util::sync::CancellationToken;

use crate::storage::Backend;

/// Split a `REMOTE_PATH=LOCAL_FILE` argument.
pub fn parse_put(spec: &str) -> Result<(&str, &Path)> {
    match spec.split_once('=') {
        Some((remote, local)) if !remote.is_empty() && !local.is_empty() => {
            Ok((remote, Path::new(local)))
        }
        _ => bail!("expected REMOTE_PATH=LOCAL_FILE, got '{}'", spec),
    }
}

/// Queue every write, then every delete, and commit once.
pub async fn apply(
    backend: &Backend,
    message: &str,
    puts: &[String],
    deletes: &[String],
    cancel: &CancellationToken,
) -> Result<()> {
    let batch = backend.batch(message, cancel).await?;

    for spec in puts {
        let (remote, local) = parse_put(spec)?;
        let content = std::fs::read(local)
            .with_context(|| format!("failed to read '{}'", local.display()))?;
        batch.write(remote, content).await?;
    }
    for path in deletes {
        batch.delete(path).await?;
    }

    let count = batch.len().await;
    match batch.commit(cancel).await? {
        Some(head) => println!("committed {} change(s) as {}", count, head),
        None => println!("nothing to commit"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_put_spec() {
        let (remote, local) = parse_put("notes/a.md=./a.md").unwrap();
        assert_eq!(remote, "notes/a.md");
        assert_eq!(local, Path::new("./a.md"));
    }

    #[test]
    fn parse_put_keeps_later_equals_in_local_path() {
        let (remote, local) = parse_put("a=b=c").unwrap();
        assert_eq!(remote, "a");
        assert_eq!(local, Path::new("b=c"));
    }

    #[test]
    fn parse_put_rejects_malformed() {
        assert!(parse_put("no-separator").is_err());
        assert!(parse_put("=local").is_err());
        assert!(parse_put("remote=").is_err());
    }
}
