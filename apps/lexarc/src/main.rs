//! # lexarc - Bulk Legal-Data Store
//!
//! The main binary for the lexarc document store.
//!
//! This application provides:
//! - Bulk-file import (reconstruction of malformed CSV exports)
//! - Keyed get/delete against the document store
//! - Filtered, sorted, paginated queries
//! - Citation-graph traversal
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/lexarc (THE BINARY)              │
//! │                                                      │
//! │   ┌─────────────┐          ┌────────────────────┐    │
//! │   │   CLI       │          │  Config (toml)     │    │
//! │   │  (clap)     │          │  lexarc.toml       │    │
//! │   └──────┬──────┘          └─────────┬──────────┘    │
//! │          │                           │               │
//! │          └───────────┬───────────────┘               │
//! │                      ▼                               │
//! │              ┌───────────────┐                       │
//! │              │  lexarc-core  │                       │
//! │              │  (THE LOGIC)  │                       │
//! │              └───────────────┘                       │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Import a decompressed bulk file
//! lexarc import -f courts.csv -k courts
//!
//! # Query
//! lexarc query -k courts --filter jurisdiction:eq:Federal --limit 10
//!
//! # Citation network
//! lexarc cite-network --id 1024 --depth 2
//! ```

mod cli;
mod config;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing — LEXARC_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("LEXARC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "lexarc=debug,lexarc_core=debug"
    } else {
        "lexarc=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the lexarc startup banner.
fn print_banner() {
    println!(
        r#"
  ██╗     ███████╗██╗  ██╗ █████╗ ██████╗  ██████╗
  ██║     ██╔════╝╚██╗██╔╝██╔══██╗██╔══██╗██╔════╝
  ██║     █████╗   ╚███╔╝ ███████║██████╔╝██║
  ██║     ██╔══╝   ██╔██╗ ██╔══██║██╔══██╗██║
  ███████╗███████╗██╔╝ ██╗██║  ██║██║  ██║╚██████╗
  ╚══════╝╚══════╝╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝ ╚═════╝

  Bulk Legal-Data Store v{}

  Streaming • Indexed • Durable
"#,
        env!("CARGO_PKG_VERSION")
    );
}
