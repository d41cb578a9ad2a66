//! CLI argument parsing for cortex-memory

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cortex-memory")]
#[command(author, version, about = "Persistent user/project memory and archival knowledge store", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a user memory field, or all fields if none given
    UserGet {
        field: Option<String>,
    },
    /// Set a user memory field (name, role, experience, os, shell, editor)
    UserSet {
        field: String,
        value: String,
    },
    /// Show project memory (summary and conventions)
    ProjectGet,
    /// Set project memory
    ProjectSet {
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        convention: Vec<String>,
    },
    /// Insert an archival entry
    Insert {
        content: String,
        #[arg(short, long)]
        tags: Vec<String>,
    },
    /// Search archival entries
    Search {
        query: String,
        #[arg(short, long)]
        tags: Vec<String>,
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
    /// List registered tool definitions
    Tools,
}
