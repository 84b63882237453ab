//! CLI module
//!
//! Command-line interface for browsing transactions.
//!
//! # Commands
//!
//! - `list` - Fetch and print one page
//! - `browse` - Page through transactions from stdin commands
//! - `serve` - Start HTTP server mode
//! - `config` - Print the effective configuration

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, AppState};
