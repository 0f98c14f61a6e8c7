//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read settings from a TOML file instead of the
//!   environment
//! - `--branch <name>`: Override the configured branch
//! - `--debug`: Enable debug logging

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ghstore - Use a GitHub repository branch as file storage
#[derive(Parser, Debug)]
#[command(name = "ghstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config file (default: GHSTORE_GITHUB_* / GITHUB_* environment)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Branch to read from and commit to, overriding the config
    #[arg(long, global = true)]
    pub branch: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print an object's content to stdout
    Cat {
        /// Object path
        path: String,

        /// Bytes to skip
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Maximum bytes to print
        #[arg(long)]
        limit: Option<u64>,

        /// Read at this branch, tag or commit instead of the configured branch
        #[arg(long = "ref", value_name = "REF")]
        reference: Option<String>,
    },

    /// Write an object from a file or stdin (one commit)
    Put {
        /// Object path
        path: String,

        /// Local file to upload; reads stdin when omitted or "-"
        file: Option<PathBuf>,
    },

    /// Delete an object (one commit; missing objects are ignored)
    Rm {
        /// Object path
        path: String,
    },

    /// List file paths under a prefix
    Ls {
        /// Path prefix (default: whole branch)
        #[arg(default_value = "")]
        prefix: String,
    },

    /// Show whether a path is a file or directory, with size and hash
    Stat {
        /// Object path
        path: String,
    },

    /// Apply several writes and deletes as a single commit
    #[command(after_help = "\
EXAMPLES:
    # Replace two files and remove a third in one commit
    ghstore apply -m \"Publish notes\" \\
        --put notes/a.md=./a.md --put notes/b.md=./b.md \\
        --rm notes/old.md

Writes are queued before deletes; for a path named more than once the last
entry wins.")]
    Apply {
        /// Commit message (default: \"Batch update via ghstore\")
        #[arg(short, long, default_value = "")]
        message: String,

        /// Write REMOTE_PATH from LOCAL_FILE
        #[arg(long = "put", value_name = "REMOTE_PATH=LOCAL_FILE")]
        puts: Vec<String>,

        /// Delete REMOTE_PATH
        #[arg(long = "rm", value_name = "REMOTE_PATH")]
        deletes: Vec<String>,
    },
}
