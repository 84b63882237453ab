// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # rooch-txscan
//!
//! Paginated transaction browser for Rooch nodes.
//!
//! A guarded fetch controller decides, for every change of the pagination
//! model or of the result store, whether the current page has to be fetched.
//! At most one fetch is in flight, and nothing is fetched once the node has
//! reported that no further pages exist.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rooch_txscan::{AppConfig, PageDriver, ResultStore, RoochTransactionSource};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> rooch_txscan::Result<()> {
//!     let config = AppConfig::default();
//!     let source = Arc::new(RoochTransactionSource::from_config(&config)?);
//!     let store = Arc::new(ResultStore::new(source));
//!     let driver = PageDriver::spawn(store, config.initial_model()?, config.driver_config()?)?;
//!
//!     driver.set_page(3);
//!     let snapshot = driver.wait_settled(driver.model(), Duration::from_secs(5)).await;
//!     println!("{} rows", snapshot.result.len());
//!
//!     driver.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   model    ┌──────────────┐  decision  ┌─────────────┐
//! │  PageDriver   │──────────▶│FetchController│──────────▶│ ResultStore │
//! │ (watch loop)  │◀──────────│  (guard)     │            │  (watch)    │
//! └───────────────┘  snapshot └──────────────┘            └──────┬──────┘
//!                                                                │ fetch_page
//!        ┌──────────┐        ┌───────────────┐        ┌─────────┴─────────┐
//!        │ GridView │        │ JsonRpcClient │◀───────│RoochTransaction-  │
//!        │ (render) │        │ retry, limits │        │Source             │
//!        └──────────┘        └───────────────┘        └───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types
pub mod types;

/// Pagination model and fetch guard
pub mod pagination;

/// HTTP client with retry and rate limiting
pub mod http;

/// JSON-RPC 2.0 client
pub mod rpc;

/// Transaction page sources
pub mod source;

/// Observable store of the last fetched page
pub mod store;

/// Reactive loop tying the model to the store
pub mod driver;

/// Grid view model
pub mod view;

/// YAML configuration
pub mod config;

/// Command-line interface
pub mod cli;

#[cfg(test)]
pub(crate) mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::AppConfig;
pub use driver::{DriverConfig, PageDriver};
pub use pagination::{FetchController, FetchDecision, PageRequest, PaginationModel, ResultPage};
pub use source::{PageSource, RoochTransactionSource};
pub use store::{ResultStore, StoreSnapshot};
pub use view::GridView;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
