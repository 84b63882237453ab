//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse Rooch transactions page by page
#[derive(Parser, Debug)]
#[command(name = "rooch-txscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Node JSON-RPC endpoint, overrides the config file
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and print a single page
    List {
        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page: u32,

        /// Rows per page (must be one of the configured options)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Page through transactions interactively
    ///
    /// Reads commands from stdin: `n` next, `p` previous, `g <page>` go to a
    /// page, `s <size>` page size, `r` redraw, `q` quit.
    Browse {
        /// Rows per page (must be one of the configured options)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on (defaults to `server.port`)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the effective configuration
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one view per line)
    Json,
    /// Human-readable table
    Pretty,
}
