use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

/// pkgstore - list and update installed Go packages with upstream changes
#[derive(Parser)]
#[command(name = "pkgstore")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").args(["stdin", "godeps", "govendor"])))]
pub struct Cli {
    /// Read newline separated import paths from stdin instead of scanning GOPATH
    #[arg(long, conflicts_with = "mcp")]
    pub stdin: bool,

    /// Read packages and pinned revisions from a Godeps.json file
    #[arg(long, value_name = "FILE")]
    pub godeps: Option<PathBuf>,

    /// Read packages and pinned revisions from a govendor vendor.json file
    #[arg(long, value_name = "FILE")]
    pub govendor: Option<PathBuf>,

    /// Run as MCP server over stdio
    #[arg(long)]
    pub mcp: bool,

    /// Log updates instead of running the package manager
    #[arg(long)]
    pub dry_run: bool,

    /// Stop after this many repositories with updates
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List repositories with upstream updates (default)
    Check,
    /// Update the packages matching each import path pattern
    Update {
        /// Import path patterns, e.g. github.com/owner/repo/...
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Show counts of packages, repositories and pending updates
    Status,
}
