//! # lexarc CLI Module
//!
//! This module implements the CLI interface for lexarc.
//!
//! ## Available Commands
//!
//! - `import` - Import a decompressed bulk file into the store
//! - `get` - Fetch one record by kind and identity
//! - `query` - Filtered/sorted/paginated search over one kind
//! - `cite-network` - Breadth-first citation-graph traversal
//! - `stats` - Per-kind storage statistics
//! - `rebuild-index` - Recompute a kind's equality indexes
//! - `delete` - Remove one record and its index memberships

mod commands;

use clap::{Parser, Subcommand};
use lexarc_core::LexarcError;
use std::path::PathBuf;

pub use commands::*;

use crate::config::AppConfig;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// lexarc - Bulk Legal-Data Store
///
/// Recovers records from malformed bulk exports and serves indexed,
/// deterministic searches over them.
#[derive(Parser, Debug)]
#[command(name = "lexarc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Store root directory (overrides the config file)
    #[arg(short = 'D', long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to the config file
    #[arg(short = 'C', long, global = true, default_value = "lexarc.toml")]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a decompressed bulk file
    Import {
        /// Path to the decompressed CSV bulk file
        #[arg(short, long)]
        file: PathBuf,

        /// Record kind (courts, dockets, opinion_clusters, opinions,
        /// citations, people)
        #[arg(short, long)]
        kind: String,

        /// Stop after importing this many records
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Fetch one record by identity
    Get {
        /// Record kind
        #[arg(short, long)]
        kind: String,

        /// Record identity
        #[arg(short, long)]
        id: u64,
    },

    /// Search one kind with filters, sort and pagination
    Query {
        /// Record kind
        #[arg(short, long)]
        kind: String,

        /// Filter predicate, repeatable: field:op:value
        /// (ops: eq, contains, starts_with, ends_with, gt, lt, gte,
        /// lte, between, in, not_in, regex, fuzzy)
        #[arg(short = 'F', long = "filter")]
        filters: Vec<String>,

        /// Sort field
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,

        /// Pagination offset
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Pagination limit
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Traverse the citation graph from one opinion
    CiteNetwork {
        /// Starting opinion identity
        #[arg(short, long)]
        id: u64,

        /// Traversal depth bound
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },

    /// Show per-kind storage statistics
    Stats,

    /// Recompute a kind's equality indexes
    RebuildIndex {
        /// Record kind
        #[arg(short, long)]
        kind: String,
    },

    /// Delete one record and its index memberships
    Delete {
        /// Record kind
        #[arg(short, long)]
        kind: String,

        /// Record identity
        #[arg(short, long)]
        id: u64,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), LexarcError> {
    let config = AppConfig::load(&cli.config)?;
    let data_dir = cli
        .data_dir
        .or(config.data_dir)
        .unwrap_or_else(|| PathBuf::from("lexarc_data"));
    let progress_every = config.progress_every.unwrap_or(1000);
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Import { file, kind, limit }) => {
            cmd_import(&data_dir, json_mode, &file, &kind, limit, progress_every)
        }
        Some(Commands::Get { kind, id }) => cmd_get(&data_dir, &kind, id),
        Some(Commands::Query {
            kind,
            filters,
            sort,
            desc,
            offset,
            limit,
        }) => cmd_query(
            &data_dir, json_mode, &kind, &filters, sort.as_deref(), desc, offset, limit,
        ),
        Some(Commands::CiteNetwork { id, depth }) => {
            cmd_cite_network(&data_dir, json_mode, id, depth)
        }
        Some(Commands::RebuildIndex { kind }) => cmd_rebuild_index(&data_dir, json_mode, &kind),
        Some(Commands::Delete { kind, id }) => cmd_delete(&data_dir, &kind, id),
        // No subcommand - show stats by default
        Some(Commands::Stats) | None => cmd_stats(&data_dir, json_mode),
    }
}
